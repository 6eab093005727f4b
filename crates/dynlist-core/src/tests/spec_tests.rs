use super::*;

#[test]
fn defaults_match_documented_values() {
    let spec = DynamicListSpec::default();
    assert_eq!(spec.page_size, 20);
    assert_eq!(spec.branch, 5);
    assert_eq!(spec.padding, 400.0);
    assert_eq!(spec.root_size(), Ok(625));
}

#[test]
fn root_size_is_branch_to_branch_minus_one() {
    assert_eq!(DynamicListSpec::new().branch(2).root_size(), Ok(2));
    assert_eq!(DynamicListSpec::new().branch(3).root_size(), Ok(9));
    assert_eq!(DynamicListSpec::new().branch(4).root_size(), Ok(64));
}

#[test]
fn tiny_branch_is_rejected() {
    for branch in [0, 1] {
        assert_eq!(
            DynamicListSpec::new().branch(branch).validate(),
            Err(SpecError::BranchTooSmall { branch })
        );
    }
}

#[test]
fn overflowing_root_is_rejected() {
    let err = DynamicListSpec::new().branch(64).root_size().unwrap_err();
    assert_eq!(err, SpecError::RootOverflow { branch: 64 });
    assert!(err.to_string().contains("64^63"));
}

#[test]
fn observer_options_use_padding_as_margin() {
    let options = DynamicListSpec::new().padding(120.0).observer_options();
    assert_eq!(options.margin, 120.0);
    assert_eq!(options.thresholds.as_slice(), &[0.0, 0.1]);
}
