//! Tests for rate queries and rounding

use clktree::drivers::{Divider, FixedSource, Gate, Mux, Output};
use clktree::util::testing;
use clktree::{ClockError, ClockTarget, EngineSettings, Rate, TopologyBuilder};
use rstest::rstest;

#[test]
fn given_fixed_source_when_querying_then_constant_rate() {
    testing::init_test_setup();
    let mut builder = TopologyBuilder::new();
    let osc = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
    let tree = builder.build(EngineSettings::default()).unwrap();

    assert_eq!(tree.get_rate(osc).unwrap(), Rate::from_mhz(24));
    assert_eq!(tree.get_rate(osc).unwrap(), Rate::from_mhz(24));
}

#[test]
fn given_fixed_source_when_configuring_then_unsupported() {
    testing::init_test_setup();
    let mut builder = TopologyBuilder::new();
    let osc = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
    let tree = builder.build(EngineSettings::default()).unwrap();

    let err = tree
        .configure(osc, ClockTarget::Rate(Rate::from_mhz(48)))
        .unwrap_err();

    assert_eq!(
        err,
        ClockError::Unsupported {
            node: osc,
            op: "configure"
        }
    );
    assert_eq!(tree.get_rate(osc).unwrap(), Rate::from_mhz(24));
}

#[test]
fn given_chain_of_outputs_when_querying_then_every_tap_reports_parent_rate() {
    testing::init_test_setup();
    let mut builder = TopologyBuilder::new();
    let osc = builder.add("osc", FixedSource::new(Rate::from_khz(32_768)));
    let first = builder.add("first", Output::new(osc));
    let second = builder.add("second", Output::new(first));
    let tree = builder.build(EngineSettings::default()).unwrap();

    assert_eq!(tree.get_rate(first).unwrap(), tree.get_rate(osc).unwrap());
    assert_eq!(tree.get_rate(second).unwrap(), tree.get_rate(osc).unwrap());
}

#[test]
fn given_disconnected_mux_when_querying_descendant_then_ancestor_error_surfaces_unchanged() {
    testing::init_test_setup();
    let mut builder = TopologyBuilder::new();
    let osc = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
    let mux = builder.add("mux", Mux::disconnected(vec![osc]));
    let div = builder.add("div", Divider::new(mux, 2));
    let out = builder.add("out", Output::new(div));
    let tree = builder.build(EngineSettings::default()).unwrap();

    assert_eq!(tree.get_rate(out).unwrap_err(), ClockError::Unavailable(mux));
}

#[test]
fn given_closed_gate_when_querying_then_zero() {
    let mut builder = TopologyBuilder::new();
    let osc = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
    let gate = builder.add("gate", Gate::new(osc, false));
    let out = builder.add("out", Output::new(gate));
    let tree = builder.build(EngineSettings::default()).unwrap();

    assert_eq!(tree.get_rate(out).unwrap(), Rate::ZERO);
}

#[rstest]
#[case(Rate::from_mhz(12), Rate::from_mhz(12))]
#[case(Rate::from_mhz(7), Rate::from_mhz(8))]
#[case(Rate::from_mhz(100), Rate::from_mhz(24))]
#[case(Rate::from_khz(1), Rate::from_hz(93_750))]
fn given_output_over_divider_when_rounding_then_nearest_divisor_and_nothing_changes(
    #[case] requested: Rate,
    #[case] expected: Rate,
) {
    testing::init_test_setup();
    let mut builder = TopologyBuilder::new();
    let osc = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
    let div = builder.add("div", Divider::new(osc, 1));
    let out = builder.add("out", Output::new(div));
    let tree = builder.build(EngineSettings::default()).unwrap();

    assert_eq!(tree.round_rate(out, requested).unwrap(), expected);
    assert_eq!(tree.get_rate(out).unwrap(), Rate::from_mhz(24));
}

#[test]
fn given_mux_when_rounding_then_closest_input_wins() {
    testing::init_test_setup();
    let mut builder = TopologyBuilder::new();
    let fast = builder.add("fast", FixedSource::new(Rate::from_mhz(48)));
    let slow = builder.add("slow", FixedSource::new(Rate::from_mhz(12)));
    let mux = builder.add("mux", Mux::new(vec![fast, slow], 0));
    let tree = builder.build(EngineSettings::default()).unwrap();

    assert_eq!(tree.round_rate(mux, Rate::from_mhz(10)).unwrap(), Rate::from_mhz(12));
    assert_eq!(tree.get_rate(mux).unwrap(), Rate::from_mhz(48));
}
