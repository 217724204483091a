//! Stage timing tests

use std::time::Duration;
use whh_infrastructure::StageTimings;

#[test]
fn test_marks_close_consecutive_stages() {
    let mut timings = StageTimings::start();
    std::thread::sleep(Duration::from_millis(5));
    let first = timings.mark("runtime");
    let second = timings.mark("readiness");

    assert!(first >= Duration::from_millis(5));
    assert!(second < first);
    let names: Vec<&str> = timings.stages().iter().map(|(name, _)| *name).collect();
    assert_eq!(names, ["runtime", "readiness"]);
    assert_eq!(timings.stage("runtime"), Some(first));
    assert_eq!(timings.stage("subject"), None);
    assert!(timings.total() >= first + second);
    assert!(timings.total_ms() >= 5);
}
