//! Headless Chromium session for the version probe.

use std::fmt::Display;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventRequestWillBeSent, GetRequestPostDataParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tracing::{debug, info, warn};

use super::{PortalVersions, ScrapeError, ScraperConfig};

fn browser_err(e: impl Display) -> ScrapeError {
    ScrapeError::Browser(e.to_string())
}

/// Load the portal and read the two version fields from its API request.
///
/// Blocks for at most the configured wait. No retries.
pub async fn probe_versions(config: &ScraperConfig) -> Result<PortalVersions, ScrapeError> {
    let url = config.portal_url()?;

    let mut builder = BrowserConfig::builder();
    if let Some(ref path) = config.chrome_path {
        builder = builder.chrome_executable(path);
    }
    let browser_config = builder.build().map_err(ScrapeError::Browser)?;

    info!(url = %url, "Launching headless browser");
    let (mut browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(browser_err)?;

    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                debug!("Browser handler error: {}", e);
            }
        }
    });

    let result = tokio::time::timeout(config.wait(), watch_requests(&browser, config, url.as_str()))
        .await
        .unwrap_or_else(|_| {
            Err(ScrapeError::Timeout {
                pattern: config.request_pattern.clone(),
                waited: config.wait(),
            })
        });

    if let Err(e) = browser.close().await {
        warn!("Failed to close browser: {}", e);
    }
    handler_task.abort();

    match &result {
        Ok(versions) => info!(
            first = %versions.first,
            second = %versions.second,
            "Read portal versions"
        ),
        Err(e) => warn!(error = %e, "Portal version probe failed"),
    }
    result
}

async fn watch_requests(
    browser: &Browser,
    config: &ScraperConfig,
    url: &str,
) -> Result<PortalVersions, ScrapeError> {
    let page = browser.new_page("about:blank").await.map_err(browser_err)?;
    page.execute(EnableParams::default())
        .await
        .map_err(browser_err)?;

    let mut requests = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(browser_err)?;

    page.goto(url).await.map_err(browser_err)?;

    while let Some(event) = requests.next().await {
        let request_url = &event.request.url;
        if !config.matches_request(request_url) {
            continue;
        }
        debug!(url = %request_url, "Matched portal request");

        let body = match event.request.post_data.clone() {
            Some(body) => Some(body),
            None => fetch_post_data(&page, &event).await,
        };
        if let Some(versions) = body.and_then(|b| config.extract_versions(&b)) {
            return Ok(versions);
        }
    }

    Err(browser_err("request stream closed"))
}

/// Large bodies are not inlined in the event and must be requested.
async fn fetch_post_data(page: &Page, event: &EventRequestWillBeSent) -> Option<String> {
    let params = GetRequestPostDataParams::new(event.request_id.clone());
    match page.execute(params).await {
        Ok(resp) => Some(resp.result.post_data),
        Err(e) => {
            debug!("No post data for {}: {}", event.request.url, e);
            None
        }
    }
}
