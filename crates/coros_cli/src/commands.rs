use crate::args::{Cli, Commands};
use anyhow::Context;
use coros_client::config::Config;
use coros_client::http_client::ReqwestCorosClient;
use coros_client::{Activity, CorosClient, FileType};
use std::io::Write;
use std::path::PathBuf;

/// Log in with `config` and run the selected command, writing results to `out`.
pub async fn run(cli: Cli, config: Config, out: &mut impl Write) -> anyhow::Result<()> {
    let mut client = ReqwestCorosClient::with_base_url(&config.base_url);
    client
        .login(&config.account, &config.password_hash)
        .await
        .with_context(|| format!("login as {} failed", config.account))?;
    tracing::info!("logged in to {}", client.base_url());

    match cli.command {
        Commands::List { count, modes } => {
            let listed = list(&client, count, &modes, out).await?;
            tracing::info!("listed {listed} activities");
        }
        Commands::Export {
            label_id,
            sport_type,
            format,
            output,
        } => {
            let path = output.unwrap_or_else(|| default_output_path(&label_id, format));
            let activity = Activity::new(label_id.as_str(), sport_type);
            let written = client
                .export_activity_to_file(&activity, format, &path)
                .await
                .with_context(|| format!("export of activity {label_id} failed"))?;
            writeln!(out, "Saved {written} bytes to {}", path.display())?;
        }
    }
    Ok(())
}

/// Print one line per activity: label id, sport type, start time and name.
pub async fn list<C>(
    client: &C,
    count: u32,
    modes: &[u32],
    out: &mut impl Write,
) -> anyhow::Result<usize>
where
    C: CorosClient + ?Sized,
{
    let activities = client
        .list_activities(count, modes)
        .await
        .context("listing activities failed")?;

    if activities.is_empty() {
        writeln!(out, "No activities returned (check --modes)")?;
        return Ok(0);
    }
    for a in &activities {
        let started = a
            .start_time()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            a.label_id(),
            a.sport_type(),
            started,
            a.name().unwrap_or("(no name)")
        )?;
    }
    Ok(activities.len())
}

pub fn default_output_path(label_id: &str, format: FileType) -> PathBuf {
    PathBuf::from(format!("{label_id}.{}", format.extension().unwrap_or("bin")))
}
