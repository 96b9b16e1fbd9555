use super::*;

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let clone = token.clone();
    assert!(token.check().is_ok());
    clone.cancel();
    assert!(token.is_cancelled());
    assert!(matches!(token.check(), Err(SlidecastError::Cancelled)));
}

#[test]
fn missing_binary_is_reported_as_tool_missing() {
    let cmd = Command::new("slidecast-definitely-not-a-real-binary");
    let err = run_tool("slidecast-definitely-not-a-real-binary", cmd, &CancelToken::new())
        .unwrap_err();
    assert!(matches!(err, SlidecastError::ToolMissing(ref t) if t.contains("not-a-real")));
}

#[test]
fn cancelled_token_short_circuits_before_spawn() {
    let token = CancelToken::new();
    token.cancel();
    let err = run_tool("ffmpeg", Command::new("ffmpeg"), &token).unwrap_err();
    assert!(matches!(err, SlidecastError::Cancelled));
}

#[cfg(unix)]
#[test]
fn non_zero_exit_keeps_stderr_verbatim() {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "echo 'bad input' >&2; exit 3"]);
    let err = run_tool("sh", cmd, &CancelToken::new()).unwrap_err();
    match err {
        SlidecastError::Encode { tool, stderr, .. } => {
            assert_eq!(tool, "sh");
            assert_eq!(stderr, "bad input");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn cancel_kills_running_child() {
    let token = CancelToken::new();
    let killer = token.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        killer.cancel();
    });
    let mut cmd = Command::new("sh");
    cmd.args(["-c", "exec sleep 30"]);
    let started = std::time::Instant::now();
    let err = run_tool("sh", cmd, &token).unwrap_err();
    handle.join().unwrap();
    assert!(matches!(err, SlidecastError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn child_token_follows_parent_but_not_the_reverse() {
    let parent = CancelToken::new();
    let child = parent.child();
    child.cancel();
    assert!(child.is_cancelled());
    assert!(!parent.is_cancelled());

    let child = parent.child();
    parent.cancel();
    assert!(child.is_cancelled());
}
