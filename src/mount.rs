use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::analysis::{AnalysisRequest, AnalysisRequester, AnalysisResult};
use crate::profile::ProfileFetcher;
use crate::view::ViewState;
use crate::{FlowError, Session};

/// The analysis screen: a profile source and an analysis service, driven once per mount.
pub struct AnalysisView {
    profiles: Arc<dyn ProfileFetcher>,
    analysis: Arc<dyn AnalysisRequester>,
}

impl AnalysisView {
    pub fn new(profiles: Arc<dyn ProfileFetcher>, analysis: Arc<dyn AnalysisRequester>) -> Self {
        Self { profiles, analysis }
    }

    /// Profile, then payload, then analysis. Stops at the first failing stage.
    pub async fn run_cycle(&self, session: &Session) -> Result<AnalysisResult, FlowError> {
        let profile = self.profiles.fetch(session).await?;
        let payload = AnalysisRequest::from_profile(&profile);
        self.analysis.request(&payload).await
    }

    /// Run one full cycle and return the state it settles in.
    pub async fn load(&self, session: &Session) -> ViewState {
        let outcome = self.run_cycle(session).await;
        if let Err(err) = &outcome {
            warn!(error = %err, "loan analysis failed");
        }

        let mut state = ViewState::Loading;
        state.settle(outcome);
        state
    }

    /// Start a cycle in the background. The returned handle starts out `Loading`.
    pub fn mount(self: &Arc<Self>, session: Session) -> Mounted {
        let (tx, rx) = watch::channel(ViewState::Loading);
        let view = Arc::clone(self);

        let task = tokio::spawn(async move {
            let state = view.load(&session).await;
            if tx.send(state).is_err() {
                debug!("view unmounted before analysis settled; discarding result");
            }
        });

        Mounted { state: rx, task }
    }
}

/// A live mount of [`AnalysisView`].
pub struct Mounted {
    state: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl Mounted {
    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn render(&self) -> String {
        self.state.borrow().render()
    }

    /// Wait for the cycle to leave `Loading`.
    pub async fn settled(&mut self) -> ViewState {
        if let Ok(state) = self.state.wait_for(ViewState::is_terminal).await {
            return state.clone();
        }
        // The task ended without publishing; whatever we last saw is all there is.
        self.state.borrow().clone()
    }

    /// Drop the view. In-flight requests keep running; their outcome goes nowhere.
    pub fn unmount(self) -> JoinHandle<()> {
        drop(self.state);
        self.task
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{LoanApplication, Scalar, UserProfile};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn profile() -> UserProfile {
        UserProfile {
            name: "A".to_string(),
            loan_application: LoanApplication {
                age: Scalar::from(30),
                income: Scalar::from(40000),
                ownership: Scalar::from("OWN"),
                employment_len: Scalar::from(2),
                loan_intent: Scalar::from("PERSONAL"),
                loan_amnt: Scalar::from(5000),
                loan_int_rate: Scalar::from(10),
                loan_percent_income: Scalar::from("0.12"),
                cred_hist_len: Scalar::from(4),
            },
            credit_score: 700.into(),
        }
    }

    struct StubProfiles(Result<UserProfile, FlowError>);

    #[async_trait]
    impl ProfileFetcher for StubProfiles {
        async fn fetch(&self, _session: &Session) -> Result<UserProfile, FlowError> {
            self.0.clone()
        }
    }

    struct StubAnalysis {
        outcome: Result<AnalysisResult, FlowError>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl StubAnalysis {
        fn new(outcome: Result<AnalysisResult, FlowError>) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
                gate: None,
            }
        }
    }

    #[async_trait]
    impl AnalysisRequester for StubAnalysis {
        async fn request(&self, _payload: &AnalysisRequest) -> Result<AnalysisResult, FlowError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.outcome.clone()
        }
    }

    fn approved() -> AnalysisResult {
        AnalysisResult {
            message: "**Approved**".to_string(),
        }
    }

    #[tokio::test]
    async fn happy_path_settles_ready() {
        let view = AnalysisView::new(
            Arc::new(StubProfiles(Ok(profile()))),
            Arc::new(StubAnalysis::new(Ok(approved()))),
        );

        let state = view.load(&Session::anonymous()).await;

        assert_eq!(state, ViewState::Ready(approved()));
        assert!(state.render().contains("<strong>Approved</strong>"));
    }

    #[tokio::test]
    async fn missing_profile_never_calls_analysis() {
        let analysis = Arc::new(StubAnalysis::new(Ok(approved())));
        let view = AnalysisView::new(
            Arc::new(StubProfiles(Err(FlowError::ProfileUnavailable))),
            analysis.clone(),
        );

        let state = view.load(&Session::anonymous()).await;

        assert_eq!(
            state,
            ViewState::Error {
                error: "No loan application data found".to_string()
            }
        );
        assert_eq!(analysis.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn profile_transport_failure_surfaces_underlying_text() {
        let view = AnalysisView::new(
            Arc::new(StubProfiles(Err(FlowError::transport("network down")))),
            Arc::new(StubAnalysis::new(Ok(approved()))),
        );

        let state = view.load(&Session::anonymous()).await;

        assert_eq!(
            state,
            ViewState::Error {
                error: "network down".to_string()
            }
        );
    }

    #[tokio::test]
    async fn analysis_rejection_surfaces_fixed_message() {
        let view = AnalysisView::new(
            Arc::new(StubProfiles(Ok(profile()))),
            Arc::new(StubAnalysis::new(Err(FlowError::AnalysisRequestFailed))),
        );

        let state = view.load(&Session::anonymous()).await;

        assert_eq!(
            state,
            ViewState::Error {
                error: "Failed to fetch analysis".to_string()
            }
        );
    }

    #[tokio::test]
    async fn remounts_are_independent() {
        let analysis = Arc::new(StubAnalysis::new(Ok(approved())));
        let view = Arc::new(AnalysisView::new(
            Arc::new(StubProfiles(Ok(profile()))),
            analysis.clone(),
        ));

        let mut first = view.mount(Session::anonymous());
        let first_state = first.settled().await;
        first.unmount().await.unwrap();

        let mut second = view.mount(Session::anonymous());
        assert_eq!(second.state(), ViewState::Loading);
        let second_state = second.settled().await;

        assert_eq!(first_state, ViewState::Ready(approved()));
        assert_eq!(first_state, second_state);
        assert_eq!(analysis.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unmount_discards_late_result() {
        let gate = Arc::new(Notify::new());
        let analysis = Arc::new(StubAnalysis {
            gate: Some(gate.clone()),
            ..StubAnalysis::new(Ok(approved()))
        });
        let view = Arc::new(AnalysisView::new(
            Arc::new(StubProfiles(Ok(profile()))),
            analysis.clone(),
        ));

        let mounted = view.mount(Session::anonymous());
        assert_eq!(mounted.state(), ViewState::Loading);
        assert!(mounted.render().contains("aria-busy"));

        let task = mounted.unmount();
        gate.notify_one();
        task.await.unwrap();

        assert_eq!(analysis.calls.load(Ordering::SeqCst), 1);
    }
}
