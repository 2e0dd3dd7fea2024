//! The fixture shipped at the workspace root must stay loadable

use std::path::Path;

use apiprobe_runner::Fixture;

#[test]
fn sample_fixture_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../sample-requests.json");
    let fixture = Fixture::load(&path).unwrap();

    let groups: Vec<_> = fixture.group_names().collect();
    assert_eq!(groups, vec!["authentication", "onboarding", "diagnostic_test"]);
    assert_eq!(fixture.test_count(), 5);
}
