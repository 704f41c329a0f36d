// Network work requested by the console, run on the async runtime

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;
use vitrine_client::{FetchError, ProfileClient, ProfileRecord};
use vitrine_core::profile::FetchTicket;

/// Work the console has asked for but not started yet.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Profile(FetchTicket),
    Icon(String),
}

/// A finished job on its way back to the console loop.
#[derive(Debug)]
pub enum Completion {
    Profile(FetchTicket, Result<ProfileRecord, FetchError>),
    Icon(String, Result<(), FetchError>),
}

/// Runs `job` as its own task; jobs overlap freely and report in completion order.
pub fn spawn_job(handle: &Handle, client: &ProfileClient, job: Job, tx: UnboundedSender<Completion>) {
    let client = client.clone();
    handle.spawn(async move {
        let completion = match job {
            Job::Profile(ticket) => Completion::Profile(ticket, client.fetch_profile().await),
            Job::Icon(src) => {
                let loaded = client.probe(&src).await;
                Completion::Icon(src, loaded)
            }
        };
        // Receiver is gone once the console has exited
        let _ = tx.send(completion);
    });
}

/// Channel the spawned jobs report back on.
pub fn completion_channel() -> (
    UnboundedSender<Completion>,
    tokio::sync::mpsc::UnboundedReceiver<Completion>,
) {
    tokio::sync::mpsc::unbounded_channel()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_icon_job_reports_back() {
        let (tx, mut rx) = completion_channel();
        let client = ProfileClient::new().unwrap();
        let src = "data:image/png;base64,AAAA".to_string();

        spawn_job(&Handle::current(), &client, Job::Icon(src.clone()), tx);

        match rx.recv().await.unwrap() {
            Completion::Icon(reported, loaded) => {
                assert_eq!(reported, src);
                assert!(loaded.is_ok());
            }
            other => panic!("unexpected completion: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_icon_source_reports_error() {
        let (tx, mut rx) = completion_channel();
        let client = ProfileClient::new().unwrap();

        spawn_job(&Handle::current(), &client, Job::Icon("::not a url".to_string()), tx);

        let Some(Completion::Icon(_, loaded)) = rx.recv().await else {
            panic!("expected an icon completion");
        };
        assert!(matches!(loaded, Err(FetchError::InvalidUrl(_))));
    }
}
