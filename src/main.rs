use {
    huffcode::{build_tree, compress, decompress, derive_codes, ByteFrequency, Result},
    log::LevelFilter,
    simplelog::{ColorChoice, Config, TermLogger, TerminalMode},
    std::{
        env, fs,
        io::{self, prelude::*},
        process,
    },
};

fn main() {
    let mut args: Vec<String> = env::args().skip(1).collect();

    // Leading -v flags raise the log level one step per v.
    let mut verbosity = 0;
    while args.first().map_or(false, |arg| is_verbosity_flag(arg)) {
        verbosity += args.remove(0).len() - 1;
    }

    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(err) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Could not set up logging: {}", err);
    }

    let (command, input, output) = match &args[..] {
        [command, input] => (command, input, None),
        [command, input, output] => (command, input, Some(output)),
        _ => print_usage(),
    };
    let op: fn(&[u8]) -> Result<Vec<u8>> = match command.as_str() {
        "compress" => compress,
        "decompress" => decompress,
        "inspect" => inspect,
        _ => print_usage(),
    };

    if let Err(err) = process(input, output.map(String::as_str), op) {
        log::error!("{}: {}", input, err);
        process::exit(1);
    }
}

fn is_verbosity_flag(arg: &str) -> bool {
    arg.len() > 1 && arg.starts_with('-') && arg[1..].chars().all(|c| c == 'v')
}

fn print_usage() -> ! {
    println!("Usage:");
    println!("  huffcode [-v...] compress <input> [<output>]     Compress a file");
    println!("  huffcode [-v...] decompress <input> [<output>]   Decompress a file");
    println!("  huffcode [-v...] inspect <input> [<output>]      Show the code built for a file");
    println!();
    println!("Use - as <input> to read stdin. Output goes to stdout unless <output> is given.");
    println!("Each -v raises the log level: info, debug, trace.");
    process::exit(1)
}

fn process(input: &str, output: Option<&str>, op: fn(&[u8]) -> Result<Vec<u8>>) -> Result<()> {
    let buf = if input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(input)?
    };

    // Nothing touches the output until the whole result exists.
    let result = op(&buf)?;
    log::info!("{} bytes in, {} bytes out", buf.len(), result.len());
    match output {
        Some(path) if path != "-" => fs::write(path, &result)?,
        _ => {
            let stdout = io::stdout();
            let mut stdout = stdout.lock();
            stdout.write_all(&result)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn inspect(bytes: &[u8]) -> Result<Vec<u8>> {
    let byte_frequency = ByteFrequency::of(bytes);
    let tree = build_tree(byte_frequency.as_ref())?;
    let coding = derive_codes(tree.as_ref());

    let (frequency, tree) = match (byte_frequency, tree) {
        (Some(frequency), Some(tree)) => (frequency, tree),
        _ => return Ok(b"Empty input: no code.\n".to_vec()),
    };
    let payload_bits = coding.encoded_len(&frequency);
    let report = format!(
        "Byte frequencies:\n{}\nCode tree:\n{}\nCodes:\n{}\n\
         {} bytes encode into {} bits ({} bytes, plus the tree and the trailer)\n",
        frequency,
        tree,
        coding,
        frequency.total(),
        payload_bits,
        (payload_bits + 7) / 8
    );
    Ok(report.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspect_reports_codes_and_size() {
        let report = String::from_utf8(inspect(b"aaab").unwrap()).unwrap();
        assert!(report.contains("Codes:\n"));
        assert!(report.ends_with("4 bytes encode into 4 bits (1 bytes, plus the tree and the trailer)\n"));
    }

    #[test]
    fn inspect_of_nothing_says_so() {
        assert_eq!(inspect(b"").unwrap(), b"Empty input: no code.\n");
    }

    #[test]
    fn verbosity_flags_are_runs_of_v() {
        assert!(is_verbosity_flag("-v"));
        assert!(is_verbosity_flag("-vvv"));
        assert!(!is_verbosity_flag("-"));
        assert!(!is_verbosity_flag("-x"));
    }
}
