use rescan::{compile_with, Error, Features, Flags, Match, Regex};
use std::{fs, path::PathBuf, process, time::Instant};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "rescan-tool", version_short = "v")]
struct Opt {
    /// The regular expression.
    pattern: String,

    /// The input values to match against.
    #[structopt(conflicts_with = "file")]
    inputs: Vec<String>,

    /// Match against the contents of a specified file.
    #[structopt(long, conflicts_with = "inputs")]
    file: Option<PathBuf>,

    /// Report every match and compile phase.
    #[structopt(long, short = "V")]
    verbose: bool,

    /// Print nothing; communicate through the exit code only.
    #[structopt(long, short = "q")]
    quiet: bool,

    /// Report compile and match timings.
    #[structopt(long, short = "t")]
    timing: bool,

    /// Print only the capture group contents of each match.
    #[structopt(long, short = "g")]
    groups_only: bool,

    /// Print the recognised feature toggles and exit.
    #[structopt(long, short = "f")]
    features: bool,

    /// Never use the bytecode path.
    #[structopt(long)]
    force_nfa: bool,

    /// Feed the input through the streaming matcher.
    #[structopt(long)]
    stream: bool,

    /// Dump the parsed AST to stdout.
    #[structopt(long)]
    dump_ast: bool,

    /// Dump the lowered NFA to stdout.
    #[structopt(long)]
    dump_nfa: bool,

    /// Dump the bytecode program to stdout.
    #[structopt(long)]
    dump_bytecode: bool,
}

/// Exit codes: 0 match, 1 no match or invalid pattern, 2 allocation
/// failure, 3 other internal errors.
fn exit_code_for(err: &Error) -> i32 {
    match err {
        Error::InvalidPattern(..) => 1,
        Error::OutOfMemory(..) => 2,
        _ => 3,
    }
}

fn format_match(m: &Match, input: &str) -> String {
    let mut result = input[m.range()].to_string();
    for group in m.captures.iter() {
        result.push(',');
        if let Some(group) = group {
            result.push_str(&input[group.clone()])
        }
    }
    result
}

fn print_features(features: &Features) {
    println!("jit_enabled: {}", features.jit_enabled);
    println!("unicode_enabled: {}", features.unicode_enabled);
    println!("streaming_enabled: {}", features.streaming_enabled);
    println!("capture_groups: {}", features.capture_groups);
    println!("backtracking: {}", features.backtracking);
    println!("prefer_jit: {}", features.prefer_jit);
    println!("prefer_streaming: {}", features.prefer_streaming);
    println!("force_nfa: {}", features.force_nfa);
    println!("enable_diagnostics: {}", features.enable_diagnostics);
    println!("debug_mode: {}", features.debug_mode);
}

fn exec_re_on_string(opt: &Opt, re: &Regex, input: &str) -> bool {
    let started = Instant::now();
    let matches = re.find_all(input);
    let elapsed = started.elapsed();
    if opt.timing {
        println!("Match time: {:?}", elapsed);
    }
    if matches.is_empty() {
        if !opt.quiet {
            println!("No match");
        }
        return false;
    }
    if opt.quiet {
        return true;
    }
    if opt.groups_only {
        for m in &matches {
            for group in m.captures.iter().flatten() {
                println!("{}", &input[group.clone()]);
            }
        }
    } else if opt.verbose {
        for m in &matches {
            println!(
                "Match {}..{}: {}",
                m.start(),
                m.end(),
                format_match(m, input)
            );
        }
    } else {
        println!(
            "Match: {}, total: {}",
            format_match(&matches[0], input),
            matches.len()
        );
    }
    true
}

/// Drive the streaming matcher, splitting the input into a few chunks to
/// exercise boundary handling.
fn exec_re_streaming(opt: &Opt, re: &Regex, input: &str) -> Result<bool, Error> {
    let mut matcher = re.streaming()?;
    let bytes = input.as_bytes();
    let chunk = (bytes.len() / 3).max(1);
    for piece in bytes.chunks(chunk) {
        matcher.feed(piece);
    }
    matcher.finalize();
    let matches = matcher.matches();
    if !opt.quiet {
        for m in matches {
            println!(
                "Match {}..{} (chunks {}..{}{})",
                m.range.start,
                m.range.end,
                m.start_chunk,
                m.end_chunk,
                if m.crosses_boundary {
                    ", crosses boundary"
                } else {
                    ""
                }
            );
        }
        if matches.is_empty() {
            println!("No match");
        }
    }
    Ok(!matches.is_empty())
}

fn run(opt: &Opt) -> i32 {
    let features = Features {
        force_nfa: opt.force_nfa,
        prefer_streaming: opt.stream,
        enable_diagnostics: opt.verbose,
        debug_mode: opt.verbose,
        ..Features::default()
    };
    if opt.features {
        print_features(&features);
        return 0;
    }

    let compile_started = Instant::now();
    let re = match compile_with(&opt.pattern, Flags::default(), features) {
        Ok(re) => re,
        Err(err) => {
            if !opt.quiet {
                eprintln!("error: {}", err);
                if features.enable_diagnostics {
                    if let Some(diagnostic) = err.diagnostic() {
                        eprintln!(
                            "  at offset {} (line {}, column {})",
                            diagnostic.offset, diagnostic.line, diagnostic.column
                        );
                    }
                }
            }
            return exit_code_for(&err);
        }
    };
    if opt.timing {
        println!("Compile time: {:?}", compile_started.elapsed());
    }

    if opt.dump_ast {
        println!("{}", re.dump_ast());
    }
    if opt.dump_nfa {
        println!("{}", re.dump_nfa());
    }
    if opt.dump_bytecode {
        match re.dump_program() {
            Some(dump) => println!("{}", dump),
            None => println!("(no bytecode program)"),
        }
    }

    let file_contents;
    let inputs: Vec<&str> = match &opt.file {
        Some(path) => {
            file_contents = match fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(err) => {
                    if !opt.quiet {
                        eprintln!("error: {}: {}", path.display(), err);
                    }
                    return 3;
                }
            };
            vec![file_contents.as_str()]
        }
        None => opt.inputs.iter().map(String::as_str).collect(),
    };

    let mut any = false;
    for input in inputs {
        let matched = if opt.stream {
            match exec_re_streaming(opt, &re, input) {
                Ok(matched) => matched,
                Err(err) => {
                    if !opt.quiet {
                        eprintln!("error: {}", err);
                    }
                    return exit_code_for(&err);
                }
            }
        } else {
            exec_re_on_string(opt, &re, input)
        };
        any |= matched;
    }
    if any {
        0
    } else {
        1
    }
}

fn main() {
    let opt = Opt::from_args();
    process::exit(run(&opt));
}
