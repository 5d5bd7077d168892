//! Debounced location search.
//!
//! Keystrokes go into a `watch` channel read by a background task. The task
//! waits for a quiet period, drops queries below the minimum length, and
//! abandons an in-flight request as soon as a newer keystroke arrives, so a
//! stale response is never published.

use crate::api::MarketplaceApi;
use reprise_types::Location;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Latest published search outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    /// Query the results belong to.
    pub query: String,
    pub results: Vec<Location>,
    pub searching: bool,
    pub error: Option<String>,
}

impl SearchSnapshot {
    fn cleared(query: String) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }
}

/// Handle to the background search task. Dropping it stops the task.
pub struct LocationSearch {
    input: watch::Sender<String>,
    output: Arc<watch::Sender<SearchSnapshot>>,
    min_chars: usize,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl LocationSearch {
    /// Spawn the search task. It stops when `cancel` fires.
    pub fn spawn<A>(
        api: Arc<A>,
        debounce: Duration,
        min_chars: usize,
        cancel: CancellationToken,
    ) -> Self
    where
        A: MarketplaceApi + 'static,
    {
        let (input, input_rx) = watch::channel(String::new());
        let (output, _) = watch::channel(SearchSnapshot::default());
        let output = Arc::new(output);
        let task = tokio::spawn(run(
            api,
            input_rx,
            Arc::clone(&output),
            debounce,
            min_chars,
            cancel.clone(),
        ));
        Self {
            input,
            output,
            min_chars,
            cancel,
            task,
        }
    }

    /// Record a keystroke. A query below the minimum length clears the
    /// published results at once; longer ones wait for the debounce.
    pub fn input(&self, text: &str) {
        self.input.send_replace(text.to_string());
        let query = text.trim();
        if query.chars().count() < self.min_chars {
            self.output
                .send_replace(SearchSnapshot::cleared(query.to_string()));
        }
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.output.borrow().clone()
    }

    /// Receiver for awaiting published results.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.output.subscribe()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for LocationSearch {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<A: MarketplaceApi>(
    api: Arc<A>,
    mut input: watch::Receiver<String>,
    output: Arc<watch::Sender<SearchSnapshot>>,
    debounce: Duration,
    min_chars: usize,
    cancel: CancellationToken,
) {
    // Set when a keystroke superseded the previous request, so the next
    // debounce window starts without waiting for another change.
    let mut pending = false;

    loop {
        if !pending {
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = input.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
        pending = false;

        // Restart the quiet period on every keystroke.
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                changed = input.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        let query = input.borrow_and_update().trim().to_string();
        if query.chars().count() < min_chars {
            output.send_replace(SearchSnapshot::cleared(query));
            continue;
        }

        output.send_modify(|snapshot| {
            snapshot.query = query.clone();
            snapshot.searching = true;
            snapshot.error = None;
        });
        debug!(query = %query, "Location search fired");

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            changed = input.changed() => {
                if changed.is_err() {
                    return;
                }
                debug!(query = %query, "Location search superseded");
                pending = true;
            }
            result = api.search_locations(&query) => {
                let snapshot = match result {
                    Ok(results) => SearchSnapshot {
                        query: query.clone(),
                        results,
                        searching: false,
                        error: None,
                    },
                    Err(e) => SearchSnapshot {
                        query: query.clone(),
                        results: Vec::new(),
                        searching: false,
                        error: Some(e.user_message()),
                    },
                };
                output.send_replace(snapshot);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn spawn(api: &Arc<MockApi>) -> LocationSearch {
        LocationSearch::spawn(Arc::clone(api), DEBOUNCE, 3, CancellationToken::new())
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_keystrokes_fires_once() {
        let api = Arc::new(MockApi::default());
        let search = spawn(&api);

        search.input("c");
        search.input("ca");
        search.input("cas");
        tokio::time::sleep(Duration::from_millis(100)).await;
        search.input("casa");
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(api.searches(), vec!["casa".to_string()]);
        let snapshot = search.snapshot();
        assert_eq!(snapshot.query, "casa");
        assert_eq!(snapshot.results[0].address_name, "casa");
        assert!(!snapshot.searching);
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_clears_without_calling() {
        let api = Arc::new(MockApi::default());
        let search = spawn(&api);

        search.input("rabat");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(search.snapshot().results.len(), 1);

        search.input("ra");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(search.snapshot().results.is_empty());
        assert_eq!(api.searches(), vec!["rabat".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn short_query_clears_before_debounce() {
        let api = Arc::new(MockApi::default());
        let search = spawn(&api);

        search.input("rabat");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(search.snapshot().results.len(), 1);

        search.input("ra");
        let snapshot = search.snapshot();
        assert!(snapshot.results.is_empty());
        assert_eq!(snapshot.query, "ra");

        search.input("rabat");
        tokio::time::sleep(Duration::from_millis(600)).await;
        search.input("");
        assert!(search.snapshot().results.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_keystroke_supersedes_in_flight_request() {
        let api = Arc::new(MockApi::default().with_search_delay(Duration::from_secs(2)));
        let search = spawn(&api);
        let mut updates = search.subscribe();

        search.input("cas");
        // Debounce elapsed, request for "cas" in flight.
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(search.snapshot().searching);

        search.input("casablanca");
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(
            api.searches(),
            vec!["cas".to_string(), "casablanca".to_string()]
        );
        let snapshot = updates.borrow_and_update().clone();
        assert_eq!(snapshot.query, "casablanca");
        assert_eq!(snapshot.results[0].address_name, "casablanca");
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_search_stops_publishing() {
        let api = Arc::new(MockApi::default().with_search_delay(Duration::from_secs(2)));
        let cancel = CancellationToken::new();
        let search = LocationSearch::spawn(Arc::clone(&api), DEBOUNCE, 3, cancel.clone());

        search.input("tanger");
        tokio::time::sleep(Duration::from_millis(700)).await;
        cancel.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(search.snapshot().results.is_empty());
        assert!(!search.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_search_publishes_message() {
        let api = Arc::new(MockApi::default().failing_search("Search unavailable"));
        let search = spawn(&api);

        search.input("fes centre");
        tokio::time::sleep(Duration::from_millis(600)).await;

        let snapshot = search.snapshot();
        assert!(snapshot.results.is_empty());
        assert_eq!(snapshot.error.as_deref(), Some("Search unavailable"));
    }
}
