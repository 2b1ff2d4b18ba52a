//! `list` and `events` commands.

use chrono::{DateTime, Utc};
use tracing::debug;

use calfetch_core::{TimeRange, parse_timestamp};
use calfetch_dav::HttpCalDavClient;

use crate::config::ServerSettings;
use crate::error::{ClientError, ClientResult};
use crate::output::{render_collections, render_events};

/// Lists the collections at the configured URL.
pub async fn list(server: &ServerSettings, json: bool) -> ClientResult<()> {
    let url = server.url().map_err(ClientError::Config)?;
    let credentials = server.credentials().map_err(ClientError::Config)?;
    let client = HttpCalDavClient::new(server.dav_config())?;

    let entries = client.get_list(url, credentials.as_ref()).await?;
    print!("{}", render_collections(&entries, json)?);
    Ok(())
}

/// Fetches events from the configured calendar.
pub async fn events(
    server: &ServerSettings,
    start: Option<&str>,
    end: Option<&str>,
    json: bool,
) -> ClientResult<()> {
    let range = time_range(start, end, Utc::now())?;
    debug!(?range, "Resolved query range");

    let url = server.url().map_err(ClientError::Config)?;
    let credentials = server.credentials().map_err(ClientError::Config)?;
    let client = HttpCalDavClient::new(server.dav_config())?;

    let events = client.get_events(url, credentials.as_ref(), &range).await?;
    print!("{}", render_events(&events, json)?);
    Ok(())
}

/// Builds the query range from `--start`/`--end`, defaulting start to `now`.
fn time_range(
    start: Option<&str>,
    end: Option<&str>,
    now: DateTime<Utc>,
) -> ClientResult<TimeRange> {
    let start = start.map(parse_arg).transpose()?.unwrap_or(now);
    match end.map(parse_arg).transpose()? {
        Some(end) => TimeRange::between(start, end)
            .ok_or_else(|| ClientError::Usage("--end must not be before --start".to_string())),
        None => Ok(TimeRange::starting_at(start)),
    }
}

fn parse_arg(value: &str) -> ClientResult<DateTime<Utc>> {
    parse_timestamp(value).ok_or_else(|| {
        ClientError::Usage(format!(
            "invalid timestamp {:?}; use RFC 3339 or YYYYMMDDTHHMMSSZ",
            value
        ))
    })
}
