use eyre::{Context, bail};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use streamdesk::config::Config;
use streamdesk::http::ApiClient;
use streamdesk::news::{FetchNewsRequest, NewsService, TopHeadlinesRequest};
use streamdesk::oauth::{OAuthManager, restore_previous_sign_in};
use streamdesk::session::StreamSession;
use streamdesk::token_store::{Credentials, FileTokenStore, TokenStore};
use streamdesk::workflow::LivestreamWorkflow;
use streamdesk::youtube::{
    BroadcastDraft, BroadcastLifeCycleStatus, BroadcastTransition, PrivacyStatus, YouTubeService,
};
use tokio_stream::StreamExt;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: streamdesk-cli [--config <path>] <command>

commands:
  news [query]                    search articles
  headlines [country]             top headlines (default: us)
  sign-in <access> <refresh>      store tokens obtained elsewhere
  restore                         refresh the stored sign-in
  disconnect                      forget the stored sign-in
  broadcasts                      list your broadcasts
  channels                        list your channels
  go-live <title> [description]   create a broadcast and stream, and bind them
      --privacy <public|unlisted|private>
      --start <RFC 3339 timestamp>  scheduled start (default: now)
      --for-kids                    mark the broadcast as made for kids
  end <broadcast-id>              end a live broadcast";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = match args.iter().position(|arg| arg == "--config") {
        Some(i) => {
            if i + 1 >= args.len() {
                bail!("--config needs a path\n\n{USAGE}");
            }
            let path = PathBuf::from(args.remove(i + 1));
            args.remove(i);
            path
        }
        None => PathBuf::from("streamdesk.toml"),
    };
    let config = Config::load(&config_path).context("load configuration")?;

    match run(&config, &args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(e) = e.downcast_ref::<streamdesk::Error>() {
                // what the user would see in an alert
                eprintln!("{}: {}", e.title(), e.user_message());
            }
            Err(e)
        }
    }
}

async fn run(config: &Config, args: &[String]) -> eyre::Result<()> {
    let client = ApiClient::default();
    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.token_path));
    let youtube = || {
        YouTubeService::new(client.clone(), Arc::clone(&tokens)).log_traffic(config.log_traffic)
    };
    let news = || {
        NewsService::new(client.clone(), config.news_api_key.clone())
            .log_traffic(config.log_traffic)
    };

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["news", query @ ..] => {
            let request = FetchNewsRequest {
                q: Some(if query.is_empty() {
                    "livestream".to_string()
                } else {
                    query.join(" ")
                }),
                sort_by: Some("publishedAt".into()),
                language: Some("en".into()),
                ..Default::default()
            };
            for article in news().fetch_news(&request).await? {
                println!(
                    "{} [{}] {}\n    {}",
                    article.published_at, article.source.name, article.title, article.url
                );
            }
        }
        ["headlines", rest @ ..] => {
            let request = TopHeadlinesRequest {
                country: Some(rest.first().copied().unwrap_or("us").to_string()),
                ..Default::default()
            };
            for article in news().top_headlines(&request).await? {
                println!("[{}] {}\n    {}", article.source.name, article.title, article.url);
            }
        }
        ["sign-in", access_token, refresh_token] => {
            tokens.save_credentials(&Credentials {
                access_token: access_token.to_string(),
                refresh_token: refresh_token.to_string(),
            })
            .await?;
            println!("signed in");
        }
        ["restore"] => {
            let oauth = OAuthManager::new(&config.oauth_client_id, &config.oauth_client_secret);
            if restore_previous_sign_in(&oauth, tokens.as_ref()).await? {
                println!("signed in");
            } else {
                println!("not signed in");
            }
        }
        ["disconnect"] => {
            tokens.clear().await?;
            println!("signed out");
        }
        ["broadcasts"] => {
            let yt = youtube();
            let mut broadcasts = std::pin::pin!(yt.list_my_broadcasts());
            while let Some(broadcast) = broadcasts.next().await {
                let broadcast = broadcast?;
                let status = broadcast.status.as_ref().and_then(|s| s.life_cycle_status);
                println!(
                    "{:<12} {} {}",
                    status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".into()),
                    broadcast.id,
                    broadcast.snippet.title
                );
                if matches!(
                    status,
                    Some(BroadcastLifeCycleStatus::Complete | BroadcastLifeCycleStatus::Revoked)
                ) {
                    // results come newest first, everything after this is history
                    break;
                }
            }
        }
        ["channels"] => {
            let yt = youtube();
            let mut channels = std::pin::pin!(yt.list_my_channels());
            while let Some(channel) = channels.next().await {
                let channel = channel?;
                println!("{} {}", channel.id, channel.snippet.title);
            }
        }
        ["go-live", rest @ ..] => {
            let draft = parse_go_live(rest)?;
            let session = StreamSession::new();
            let yt = youtube();
            let mut channels = std::pin::pin!(yt.list_my_channels());
            if let Some(channel) = channels.next().await {
                let channel = channel?;
                println!("going live on {}", channel.snippet.title);
                session.set_channel_id(channel.id).await;
            }

            let workflow =
                LivestreamWorkflow::new(yt.clone(), Arc::clone(&tokens), session.clone());
            let bound = workflow.run(&draft).await?;
            println!("broadcast {} bound to stream {}", bound.broadcast_id, bound.stream_id);
            println!(
                "publish to {}",
                session
                    .publish_url(&config.fallback_publish_url, &config.fallback_stream_name)
                    .await
            );
        }
        ["end", broadcast_id] => {
            let broadcast = youtube()
                .transition_broadcast(broadcast_id, BroadcastTransition::Complete)
                .await?;
            println!("ended {}", broadcast.id);
        }
        _ => bail!("unrecognized command\n\n{USAGE}"),
    }
    Ok(())
}

/// Builds a draft from `go-live` arguments: flags anywhere, then the title and description words.
fn parse_go_live(args: &[&str]) -> eyre::Result<BroadcastDraft> {
    let mut draft = BroadcastDraft::default();
    let mut words = Vec::new();
    let mut args = args.iter();
    while let Some(&arg) = args.next() {
        match arg {
            "--privacy" => {
                let Some(value) = args.next() else {
                    bail!("--privacy needs a value");
                };
                draft.privacy_status = value.parse::<PrivacyStatus>().map_err(|e| eyre::eyre!(e))?;
            }
            "--start" => {
                let Some(value) = args.next() else {
                    bail!("--start needs a timestamp");
                };
                draft.scheduled_start_time = value
                    .parse()
                    .with_context(|| format!("parse start time {value:?}"))?;
            }
            "--for-kids" => draft.is_for_kids = true,
            flag if flag.starts_with("--") => bail!("unknown go-live option {flag}"),
            word => words.push(word),
        }
    }

    let Some((title, description)) = words.split_first() else {
        bail!("go-live needs a title\n\n{USAGE}");
    };
    draft.title = title.to_string();
    draft.description = description.join(" ");
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn go_live_defaults() {
        let draft = parse_go_live(&["Friday", "night", "lights"]).unwrap();
        assert_eq!(draft.title, "Friday");
        assert_eq!(draft.description, "night lights");
        assert_eq!(draft.privacy_status, PrivacyStatus::Public);
        assert!(!draft.is_for_kids);
    }

    #[test]
    fn go_live_options() {
        let draft = parse_go_live(&[
            "--privacy",
            "unlisted",
            "Friday",
            "--start",
            "2025-10-24T23:00:00Z",
            "--for-kids",
            "from the stadium",
        ])
        .unwrap();
        assert_eq!(draft.title, "Friday");
        assert_eq!(draft.description, "from the stadium");
        assert_eq!(draft.privacy_status, PrivacyStatus::Unlisted);
        assert_eq!(
            draft.scheduled_start_time,
            "2025-10-24T23:00:00Z".parse::<jiff::Timestamp>().unwrap()
        );
        assert!(draft.is_for_kids);
    }

    #[test]
    fn go_live_rejects_bad_input() {
        assert!(parse_go_live(&[]).is_err());
        assert!(parse_go_live(&["--for-kids"]).is_err());
        assert!(parse_go_live(&["Friday", "--privacy"]).is_err());
        assert!(parse_go_live(&["Friday", "--privacy", "friends"]).is_err());
        assert!(parse_go_live(&["Friday", "--start", "tomorrow"]).is_err());
        assert!(parse_go_live(&["Friday", "--loud"]).is_err());
    }
}
