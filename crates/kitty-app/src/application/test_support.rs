use async_trait::async_trait;
use kitty_domain::{BackendCaller, CallArgs, CallError};
use mockall::mock;
use serde_json::Value;
use std::sync::Arc;

mock! {
    pub Backend {}

    #[async_trait]
    impl BackendCaller for Backend {
        async fn call(&self, command: &str, args: CallArgs) -> Result<Value, CallError>;
    }
}

/// Mock that expects exactly one `command` call and answers with `reply`
pub fn expect_once(
    command: &'static str,
    check_args: impl Fn(&CallArgs) + Send + 'static,
    reply: Result<Value, CallError>,
) -> Arc<MockBackend> {
    let mut backend = MockBackend::new();
    backend
        .expect_call()
        .times(1)
        .returning(move |called, args| {
            assert_eq!(called, command);
            check_args(&args);
            reply.clone()
        });
    Arc::new(backend)
}

pub fn no_args(args: &CallArgs) {
    assert!(args.is_empty(), "unexpected args: {args:?}");
}
