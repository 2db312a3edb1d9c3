use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use serde_json::json;
use theme_tokens_core::{generate_tokens, DesignTokens};
use tracing::{span, Event, Metadata, Subscriber};

struct CountEvents(Arc<AtomicUsize>);

impl Subscriber for CountEvents {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }
    fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
        span::Id::from_u64(1)
    }
    fn record(&self, _: &span::Id, _: &span::Record<'_>) {}
    fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}
    fn event(&self, _: &Event<'_>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
    fn enter(&self, _: &span::Id) {}
    fn exit(&self, _: &span::Id) {}
}

// One test so the two runs never race on callsite interest.
#[test]
fn silent_hides_build_logs() {
    let tokens = DesignTokens::from_json(json!({ "color": { "a": { "value": "#000" } } })).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let count = Arc::new(AtomicUsize::new(0));

    tracing::subscriber::with_default(CountEvents(count.clone()), || {
        generate_tokens(&tokens, dir.path(), false).unwrap();
    });
    let loud = count.swap(0, Ordering::SeqCst);
    assert!(loud > 0);

    tracing::subscriber::with_default(CountEvents(count.clone()), || {
        generate_tokens(&tokens, dir.path(), true).unwrap();
        tracing::info!("after the run");
    });
    assert_eq!(count.load(Ordering::SeqCst), 1);
}
