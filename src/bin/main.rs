use crop_buddy::{config::Settings, Session};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

const CHART_WIDTH: usize = 40;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();

    let settings = Settings::from_env()?;
    let engine = settings.build_engine()?;
    let mut session = Session::new();

    info!("Crop Buddy chat starting");

    let mut stdout = tokio::io::stdout();
    stdout
        .write_all("🌾 Smart Crop Buddy. Tell me your soil N, P, K, temperature, humidity, pH and rainfall, or ask how to grow a crop. Type '/history' for the transcript or 'quit' to leave.\n".as_bytes())
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all("👨‍🌾 > ".as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if matches!(utterance, "quit" | "exit") {
            break;
        }
        if utterance == "/history" {
            let transcript = session.history.get_formatted_transcript();
            stdout.write_all(format!("{}\n", transcript).as_bytes()).await?;
            continue;
        }

        let mut out = String::new();
        match engine.respond(&mut session, utterance) {
            Ok(reply) => {
                if let Some(ack) = &reply.acknowledgment {
                    out.push_str(&format!("{}\n", ack));
                }
                if let Some(text) = &reply.response {
                    out.push_str(&format!("{}\n", text));
                }
                if let Some(chart) = &reply.chart {
                    out.push_str(&format!("\n{}", chart.render_ascii(CHART_WIDTH)));
                }
            }
            Err(e) => out.push_str(&format!("⚠️ Recommendation failed: {}\n", e)),
        }
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
    }

    info!(messages = session.history.message_count(), "Chat ended");
    Ok(())
}
