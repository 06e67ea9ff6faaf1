use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        return;
    };
    let completions_dir = out_dir.join("completions");
    if fs::create_dir_all(&completions_dir).is_err() {
        return;
    }

    let mut cmd = clap::Command::new("lektion")
        .about("Turn articles and PDFs into German reading lessons")
        .arg(clap::arg!(<INPUT> "URL, local .pdf or .html file, '-' for HTML on stdin, or 'random'"))
        .arg(clap::arg!(--extract_only "Print the extracted text instead of generating a lesson"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format for --extract-only (text, json)")
                .default_value("text")
                .value_parser(["text", "json"]),
        )
        .arg(clap::arg!(--api_key <KEY> "API key for the chat-completion endpoint"))
        .arg(clap::arg!(--model <MODEL> "Chat model used to write the lesson"))
        .arg(clap::arg!(--base_url <URL> "Base URL of the OpenAI-compatible API"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout for page fetches in seconds").default_value("15"))
        .arg(clap::arg!(--no_reader "Skip the reader-proxy fallback"))
        .arg(
            clap::arg!(--selectors <FILE> "Replace the built-in content selectors with the ones in FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            clap::arg!(--noise_rules <FILE> "Replace the built-in class/id noise rules with the ones in FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--feed <URL> "RSS feed used for 'random'"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    for shell in [
        clap_complete::Shell::Bash,
        clap_complete::Shell::Zsh,
        clap_complete::Shell::Fish,
        clap_complete::Shell::PowerShell,
    ] {
        if let Err(err) = clap_complete::generate_to(shell, &mut cmd, "lektion", &completions_dir) {
            println!("cargo:warning=Failed to generate {} completions: {}", shell, err);
        }
    }
}
