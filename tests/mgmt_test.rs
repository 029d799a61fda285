//! Tests for per-peripheral clock management: states and callbacks

use std::sync::{Arc, Mutex};

use clktree::drivers::{ClockEvent, Divider, FixedSource, Gate, Output};
use clktree::mgmt::{STATE_DEFAULT, STATE_PRIV_START, STATE_SLEEP};
use clktree::util::testing;
use clktree::{
    ClockError, ClockId, ClockManagement, ClockState, ClockTarget, ClockTree, EngineSettings,
    ManagementError, Rate, TopologyBuilder,
};

struct Fixture {
    tree: ClockTree,
    mgmt: ClockManagement,
    osc: ClockId,
    div: ClockId,
    gate: ClockId,
}

/// osc 24 MHz -> div /2 -> gate -> bus_clk
///                     \-> core_clk
/// `uart0` consumes core_clk (output 0) and bus_clk (output 1).
fn uart_fixture() -> Fixture {
    let mut builder = TopologyBuilder::new();
    let osc = builder.add("osc", FixedSource::new(Rate::from_mhz(24)));
    let div = builder.add("div", Divider::new(osc, 2));
    let gate = builder.add("gate", Gate::new(div, true));
    let core = builder.add("core_clk", Output::new(div));
    let bus = builder.add("bus_clk", Output::new(gate));

    let states = vec![
        ClockState::new("default")
            .with(div, ClockTarget::Divisor(2))
            .with(gate, ClockTarget::Gate(true)),
        ClockState::new("sleep").with(gate, ClockTarget::Gate(false)),
        ClockState::new("broken")
            .with(div, ClockTarget::Divisor(4))
            .with(osc, ClockTarget::Rate(Rate::from_mhz(1)))
            .with(gate, ClockTarget::Gate(false)),
    ];
    let mgmt = ClockManagement::define(&mut builder, "uart0", vec![core, bus], states);
    let tree = builder.build(EngineSettings::default()).unwrap();
    Fixture {
        tree,
        mgmt,
        osc,
        div,
        gate,
    }
}

fn recording_callback(mgmt: &ClockManagement) -> Arc<Mutex<Vec<ClockEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    mgmt.set_callback(move |event| sink.lock().unwrap().push(event));
    events
}

#[test]
fn given_outputs_when_querying_rate_then_output_rates_returned() {
    testing::init_test_setup();
    let f = uart_fixture();

    assert_eq!(f.mgmt.rate(&f.tree, 0).unwrap(), Rate::from_mhz(12));
    assert_eq!(f.mgmt.rate(&f.tree, 1).unwrap(), Rate::from_mhz(12));
    assert_eq!(
        f.mgmt.rate(&f.tree, 2).unwrap_err(),
        ManagementError::NoSuchOutput { index: 2, count: 2 }
    );
}

#[test]
fn given_consumer_node_when_built_then_subscribed_to_every_output() {
    let f = uart_fixture();
    let consumer = f.mgmt.consumer();

    for &output in f.mgmt.outputs() {
        assert!(f.tree.node(output).unwrap().children().contains(consumer));
    }
    assert!(f.tree.arena().leaf_nodes().contains(&"uart0".to_string()));
}

#[test]
fn given_sleep_state_when_applied_then_gate_closes_and_callback_sees_zero() {
    testing::init_test_setup();
    let f = uart_fixture();
    let events = recording_callback(&f.mgmt);

    f.mgmt.apply_state(&f.tree, STATE_SLEEP).unwrap();

    assert_eq!(f.mgmt.rate(&f.tree, 1).unwrap(), Rate::ZERO);
    assert_eq!(
        *events.lock().unwrap(),
        vec![ClockEvent {
            output: 1,
            rate: Rate::ZERO
        }]
    );

    f.mgmt.apply_state(&f.tree, STATE_DEFAULT).unwrap();
    assert_eq!(f.mgmt.rate(&f.tree, 1).unwrap(), Rate::from_mhz(12));
}

#[test]
fn given_shared_divider_when_changed_then_callback_sees_every_affected_output() {
    testing::init_test_setup();
    let f = uart_fixture();
    let events = recording_callback(&f.mgmt);

    f.tree.configure(f.div, ClockTarget::Divisor(4)).unwrap();

    // div notifies gate before core_clk: registration order
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            ClockEvent {
                output: 1,
                rate: Rate::from_mhz(6)
            },
            ClockEvent {
                output: 0,
                rate: Rate::from_mhz(6)
            },
        ]
    );
}

#[test]
fn given_failing_setting_when_applying_state_then_stops_without_rollback() {
    testing::init_test_setup();
    let f = uart_fixture();
    let broken = f.mgmt.state_index("broken").unwrap();
    assert_eq!(broken, STATE_PRIV_START);

    let err = f.mgmt.apply_state(&f.tree, broken).unwrap_err();

    assert_eq!(
        err,
        ManagementError::Clock(ClockError::Unsupported {
            node: f.osc,
            op: "configure"
        })
    );
    // first setting stays applied, the one after the failure never ran
    assert_eq!(f.tree.get_rate(f.div).unwrap(), Rate::from_mhz(6));
    assert_eq!(f.tree.get_rate(f.gate).unwrap(), Rate::from_mhz(6));
}

#[test]
fn given_unknown_state_when_applying_then_no_such_state() {
    let f = uart_fixture();

    assert_eq!(
        f.mgmt.apply_state(&f.tree, 9).unwrap_err(),
        ManagementError::NoSuchState { index: 9, count: 3 }
    );
    assert_eq!(f.mgmt.state_index("idle"), None);
}

#[test]
fn given_cleared_callback_when_rate_changes_then_nothing_delivered() {
    testing::init_test_setup();
    let f = uart_fixture();
    let events = recording_callback(&f.mgmt);
    f.mgmt.clear_callback();
    assert!(!f.mgmt.has_callback());

    f.tree.configure(f.div, ClockTarget::Divisor(4)).unwrap();

    assert!(events.lock().unwrap().is_empty());
}
