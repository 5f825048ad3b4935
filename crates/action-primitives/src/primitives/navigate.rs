//! Navigate and search primitives

use tracing::{debug, info, warn};
use url::Url;

use crate::{
    errors::BrowserError,
    primitives::DefaultBrowserSession,
    types::NavigationReport,
    waiting::wait_for_settle,
};

/// Open a new tab at `url`, wait for load (bounded) plus the settle delay.
///
/// Only tab creation can fail. A slow load returns whatever URL the tab
/// currently reports, flagged as unsettled.
pub async fn execute_navigate(
    session: &DefaultBrowserSession,
    url: &str,
) -> Result<NavigationReport, BrowserError> {
    info!(url = %url, "Executing navigate primitive");

    let tab = session
        .host()
        .open_tab(url)
        .await
        .map_err(|err| match err {
            BrowserError::TabCreation(_) => err,
            other => BrowserError::TabCreation(other.to_string()),
        })?;
    session.set_active_tab(tab.clone());

    let outcome = wait_for_settle(session.host(), &tab, session.timings()).await;
    let mut report = NavigationReport {
        requested_url: url.to_string(),
        final_url: url.to_string(),
        settled: outcome.is_settled(),
        warnings: outcome.warning().into_iter().collect(),
    };

    match session.host().current_url(&tab).await {
        Ok(current) if !current.is_empty() => report.final_url = current,
        Ok(_) => {}
        Err(err) => {
            warn!(tab = %tab, error = %err, "could not read tab url after navigation");
            report.warnings.push(format!("could not read current url: {err}"));
        }
    }

    info!(
        tab = %tab,
        final_url = %report.final_url,
        settled = report.settled,
        "Navigate completed"
    );
    Ok(report)
}

/// Navigate to the engine's results page and verify the query survived.
pub async fn execute_search(
    session: &DefaultBrowserSession,
    query: &str,
) -> Result<NavigationReport, BrowserError> {
    let engine = session.search_engine();
    let target = engine.results_url(query);
    debug!(query = %query, url = %target, "Executing search primitive");

    let mut report = execute_navigate(session, &target).await?;
    if !carries_query(&report.final_url, &engine.query_param) {
        warn!(
            final_url = %report.final_url,
            param = %engine.query_param,
            "search results url lost its query parameter"
        );
        report.warnings.push(format!(
            "results url has no '{}' parameter; results may still be loading",
            engine.query_param
        ));
    }
    Ok(report)
}

fn carries_query(url: &str, param: &str) -> bool {
    Url::parse(url)
        .map(|parsed| {
            parsed
                .query_pairs()
                .any(|(key, value)| key == param && !value.trim().is_empty())
        })
        .unwrap_or(false)
}
