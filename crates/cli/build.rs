use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("fieldprobe")
        .version("0.1.0")
        .about("Find the smallest HTML block that holds a label and its value")
        .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
        .arg(clap::arg!(<TEXT> ... "LABEL VALUE, or just VALUE with --value-only").num_args(1..=2))
        .arg(
            clap::arg!(-m --mode <MODE> "Where to match (text, element, cleaned)")
                .default_value("text")
                .value_parser(["text", "element", "cleaned"]),
        )
        .arg(clap::arg!(--"partial-label" "Match the label as a substring"))
        .arg(clap::arg!(--"partial-value" "Match the value as a substring"))
        .arg(clap::arg!(--"case-sensitive" "Compare without case folding"))
        .arg(clap::arg!(--first "Stop at the first fragment"))
        .arg(clap::arg!(--"value-only" "Extract the containers of VALUE alone"))
        .arg(clap::arg!(--details "Include the CSS path of each fragment"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (text, json)")
                .default_value("text")
                .value_parser(["text", "json"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("10"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests"))
        .arg(clap::arg!(-H --header <HEADER> ... "Extra request header, 'Name: value'"))
        .arg(clap::arg!(-v --verbose "Trace every label/value pair"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "fieldprobe", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "fieldprobe", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "fieldprobe", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "fieldprobe", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
