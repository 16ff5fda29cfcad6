use approx::assert_relative_eq;
use scroll_flow::{
    colour::Colour,
    data_structures::scene_graph::ContainerNode,
    scene::{
        entity::Slot,
        input::{CursorState, ScrollInput},
        panel::{MaterialPalette, ParameterPanel, TINTED_MATERIAL},
        tween::SECTION_SPIN,
    },
};

use crate::common::{FRAME, HEIGHT, Scenario};

mod common;

#[test]
fn crossing_into_the_second_section_spins_only_its_mesh() {
    let mut scenario = Scenario::new();
    let before = scenario.sections.clone();

    // Scrolling within the first section starts nothing
    assert_eq!(scenario.scroll(ScrollInput::Pixels(HEIGHT * 0.4)), None);
    assert!(scenario.tweens.is_empty());

    assert_eq!(scenario.scroll(ScrollInput::Pixels(HEIGHT * 0.2)), Some(1));
    assert_eq!(scenario.tweens.len(), 1);
    assert_eq!(scenario.tweens.iter().next().map(|t| t.target), Some(1));

    scenario.frames(120);

    assert!(scenario.tweens.is_empty());
    let spun = scenario.sections[1].rotation - before[1].rotation;
    assert_relative_eq!(spun.x, SECTION_SPIN[0], epsilon = 1e-3);
    assert_relative_eq!(spun.y, SECTION_SPIN[1], epsilon = 1e-3);
    assert_relative_eq!(spun.z, SECTION_SPIN[2], epsilon = 1e-3);
    assert_eq!(scenario.sections[2], before[2]);
    assert_eq!(scenario.sections[3], before[3]);
}

#[test]
fn resizing_mid_scroll_keeps_the_section_without_a_spin() {
    let mut scenario = Scenario::new();
    assert_eq!(scenario.scroll(ScrollInput::Pixels(HEIGHT)), Some(1));
    scenario.frames(120);
    assert!(scenario.tweens.is_empty());
    let elevation = scenario.driver.rig.elevation;
    let sections = scenario.sections.clone();

    scenario.resize(1700.0);
    assert_eq!(scenario.input.scroll.section, 1);
    assert_eq!(scenario.scroll(ScrollInput::Pixels(0.0)), None);
    assert!(scenario.tweens.is_empty());

    scenario.frame(FRAME);
    assert_relative_eq!(scenario.driver.rig.elevation, elevation, epsilon = 1e-4);
    assert_eq!(scenario.sections[1..], sections[1..]);

    scenario.resize(300.0);
    scenario.frame(FRAME);
    assert_eq!(scenario.input.scroll.section, 1);
    assert!(scenario.tweens.is_empty());
    assert_relative_eq!(scenario.driver.rig.elevation, elevation, epsilon = 1e-4);
}

#[test]
fn fast_scroll_past_the_end_stays_on_the_last_section() {
    let mut scenario = Scenario::new();
    assert_eq!(scenario.scroll(ScrollInput::Pixels(HEIGHT * 50.0)), Some(3));
    assert_eq!(scenario.scroll(ScrollInput::Pixels(HEIGHT * 50.0)), None);
    assert_eq!(scenario.input.scroll.section, 3);
    scenario.frames(10);
    assert_relative_eq!(
        scenario.driver.rig.elevation,
        -3.0 * scenario.config.scene.objects_distance
    );
}

#[test]
fn failed_loads_leave_their_slot_empty_and_frames_continue() {
    let mut scenario = Scenario::new();
    scenario
        .entities
        .resolve(Slot::Bally, Err(anyhow::anyhow!("Bally_Male.glb: not found")));
    scenario
        .entities
        .resolve(Slot::Planet, Ok(Box::new(ContainerNode::new(1))));

    scenario.frames(600);

    assert!(!scenario.entities.bally.is_loaded());
    let planet = scenario.entities.planet.get().unwrap();
    assert_relative_eq!(planet.pose.rotation.x, 600.0 * 0.002, epsilon = 1e-3);
}

#[test]
fn a_load_arriving_late_is_placed_and_animated() {
    let mut scenario = Scenario::new();
    scenario.frames(30);
    scenario
        .entities
        .resolve(Slot::Bally, Ok(Box::new(ContainerNode::new(1))));
    scenario.frames(1);
    let bally = scenario.entities.bally.get().unwrap();
    assert_eq!(bally.pose.scale, Slot::Bally.initial_pose().scale);
    assert_relative_eq!(
        bally.pose.position.x,
        (scenario.driver.elapsed() * 0.1).sin() * 2.0
    );
}

#[test]
fn parallax_converges_on_the_cursor_without_overshoot() {
    let mut scenario = Scenario::new();
    scenario.input.cursor = CursorState { x: 0.5, y: 0.5 };
    let target = (0.25, -0.25);

    let mut previous = scenario.driver.rig.offset;
    for _ in 0..300 {
        scenario.frame(FRAME);
        let offset = scenario.driver.rig.offset;
        assert!(offset.x >= previous.x && offset.x <= target.0);
        assert!(offset.y <= previous.y && offset.y >= target.1);
        previous = offset;
    }
    assert_relative_eq!(previous.x, target.0, epsilon = 1e-4);
    assert_relative_eq!(previous.y, target.1, epsilon = 1e-4);
}

#[test]
fn the_figure_stays_in_front_of_the_camera_for_hours() {
    let mut scenario = Scenario::new();
    scenario
        .entities
        .resolve(Slot::Bally, Ok(Box::new(ContainerNode::new(1))));
    let limit = scenario.config.frame.tan_limit * 1.5;
    for _ in 0..3600 {
        scenario.frame(1.0);
        let z = scenario.entities.bally.get().unwrap().pose.position.z;
        assert!(z.is_finite() && z.abs() <= limit + 1e-4);
    }
}

#[test]
fn tint_changes_exactly_two_materials() {
    let colours: Vec<Colour> = ["#E4572E", "#17BEBB", "#FFC914", "#76B041"]
        .iter()
        .map(|hex| hex.parse().unwrap())
        .collect();
    let mut palette = MaterialPalette::new(colours.clone(), "#ffeded".parse().unwrap());
    let mut panel = ParameterPanel::new("#ffeded".parse().unwrap(), vec![]);

    panel.edit_hex("#336699", &mut palette).unwrap();

    let tint: Colour = "#336699".parse().unwrap();
    for (i, colour) in palette.toon.iter().enumerate() {
        if i == TINTED_MATERIAL {
            assert_eq!(*colour, tint);
        } else {
            assert_eq!(*colour, colours[i]);
        }
    }
    assert_eq!(palette.particles, tint);
}
