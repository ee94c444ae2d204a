use clap::Parser;
use sofar_query_svc::http_backend::{DEFAULT_BACKEND_URL, HttpBackend};
use sofar_query_svc::submitter::{PromptSubmitter, SubmissionState, render};

#[derive(Parser, Debug)]
#[command(name = "sofar-ask")]
#[command(about = "Ask the Sofar query service a question about ocean conditions")]
struct Args {
    /// Question, e.g. "show me wind speed and battery"
    #[arg(trailing_var_arg = true, required = true)]
    prompt: Vec<String>,

    /// Base URL of the running query service
    #[arg(long, env = "SOFAR_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let prompt = args.prompt.join(" ");

    let submitter = PromptSubmitter::new(HttpBackend::new(args.backend));

    println!("🔍 {}", prompt);
    println!("{}", render(&SubmissionState::Loading));

    if let Err(e) = submitter.submit(&prompt).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    println!("{}", submitter.render().await);
    Ok(())
}
