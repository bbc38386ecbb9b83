mod common;

mod tests {
    use embassy_time::Duration;
    use lumen_core::persistence::{RESTORE_RECORD_SIZE, preference_key};
    use lumen_core::{
        FrameScheduler, Light, LightCall, LightConfig, LightEvent, LightEventChannel,
        LightIntentChannel, RestoreMode, RestoreRecord,
    };

    use super::common::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn light_with_store(config: &LightConfig, store: &MemoryStore) -> Light<TestOutput> {
        let state = state_with(config, rgb_traits()).with_store(Box::new(store.clone()));
        Light::with_state(TestOutput::new(rgb_traits()), state)
    }

    #[test]
    fn test_setup_default_on_without_saved_values() {
        let config = LightConfig::new("desk").with_restore_mode(RestoreMode::RestoreDefaultOn);
        let mut light = Light::new(TestOutput::new(rgb_traits()), &config);

        light.setup(at(0));

        assert!(light.state().current_values().is_on());
        assert!(!light.state().is_transformer_active());
        assert_eq!(light.output().writes.get(), 1);
    }

    #[test]
    fn test_setup_default_off_without_saved_values() {
        let mut light = Light::new(TestOutput::new(rgb_traits()), &LightConfig::new("desk"));

        light.setup(at(0));

        assert!(!light.state().current_values().is_on());
        assert_eq!(light.state().current_values_as_rgb(), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_values_survive_restart() {
        let store = MemoryStore::default();
        let config = LightConfig::new("shelf");

        let mut first = light_with_store(&config, &store);
        first.setup(at(0));
        first.perform(
            LightCall::turn_on()
                .with_brightness(0.4)
                .with_rgb(1.0, 0.0, 0.0)
                .with_transition_length(ms(0)),
            at(10),
        );

        let mut second = light_with_store(&config, &store);
        second.setup(at(0));

        let values = second.state().current_values();
        assert!(values.is_on());
        assert_eq!(values.brightness(), 0.4);
        assert_eq!((values.red(), values.green(), values.blue()), (1.0, 0.0, 0.0));
    }

    #[test]
    fn test_inverted_restore_flips_state() {
        let store = MemoryStore::default();
        let config =
            LightConfig::new("hall").with_restore_mode(RestoreMode::RestoreInvertedDefaultOff);

        let mut first = light_with_store(&config, &store);
        first.setup(at(0));
        first.perform(
            LightCall::turn_on()
                .with_brightness(0.7)
                .with_transition_length(ms(0)),
            at(10),
        );

        let mut second = light_with_store(&config, &store);
        second.setup(at(0));

        assert!(!second.state().current_values().is_on());
        assert_eq!(second.state().remote_values().brightness(), 0.7);
    }

    #[test]
    fn test_always_off_ignores_saved_values() {
        let store = MemoryStore::default();
        let saved = RestoreRecord {
            brightness: 0.2,
            ..RestoreRecord::with_state(true)
        };
        saved
            .save(&mut store.clone(), preference_key("porch"))
            .expect("memory store never fails");

        let config = LightConfig::new("porch").with_restore_mode(RestoreMode::AlwaysOff);
        let mut light = light_with_store(&config, &store);
        light.setup(at(0));

        assert!(!light.state().current_values().is_on());
        assert_eq!(light.state().current_values().brightness(), 1.0);
    }

    #[test]
    fn test_corrupt_record_falls_back_to_default() {
        let store = MemoryStore::default();
        let mut bytes = vec![0u8; RESTORE_RECORD_SIZE];
        bytes[0] = 0xEE;
        store.data.borrow_mut().insert(preference_key("attic"), bytes);

        let config = LightConfig::new("attic").with_restore_mode(RestoreMode::RestoreDefaultOn);
        let mut light = light_with_store(&config, &store);
        light.setup(at(0));

        assert!(light.state().current_values().is_on());
    }

    #[test]
    fn test_active_effect_survives_restart() {
        let store = MemoryStore::default();
        let config = LightConfig::new("lamp");

        let mut first = light_with_store(&config, &store);
        add_counting_effect(first.state_mut(), "Pulse");
        first.setup(at(0));
        turn_on_now(first.state_mut(), 1.0);
        first.perform(LightCall::new().with_effect(1), at(10));

        let mut second = light_with_store(&config, &store);
        let counters = add_counting_effect(second.state_mut(), "Pulse");
        second.setup(at(0));

        assert_eq!(second.state().active_effect_index(), 1);
        assert_eq!(counters.starts.get(), 1);
        assert!(counters.applies.get() >= 1);
    }

    #[test]
    fn test_tick_runs_transition() {
        let mut light = Light::new(TestOutput::new(rgb_traits()), &LightConfig::new("fade"));
        light.setup(at(0));

        light.perform(
            LightCall::turn_on()
                .with_brightness(1.0)
                .with_transition_length(ms(1000)),
            at(0),
        );
        assert_eq!(light.state().remote_values().brightness(), 1.0);
        assert!(light.state().remote_values().is_on());

        light.tick(at(500));
        let halfway = light.state().current_values().brightness();
        assert!((halfway - 0.5).abs() < 1e-3);
        assert!(light.state().current_values().is_on());

        light.tick(at(1000));
        assert!(!light.state().is_transformer_active());
        assert_eq!(light.state().current_values(), light.state().remote_values());
    }

    #[test]
    fn test_flash_restores_and_publishes_at_end() {
        static EVENTS: LightEventChannel = LightEventChannel::new();

        let state = rgb_state().with_events(EVENTS.sender());
        let mut light = Light::with_state(TestOutput::new(rgb_traits()), state);
        light.setup(at(0));
        turn_on_now(light.state_mut(), 0.5);
        while EVENTS.try_receive().is_ok() {}

        light.perform(
            LightCall::new()
                .with_rgb(0.0, 0.0, 1.0)
                .with_flash_length(ms(300)),
            at(0),
        );
        let restore = *light.state().remote_values();
        assert_eq!(restore.blue(), 1.0);
        assert_eq!(restore.brightness(), 0.5);
        while EVENTS.try_receive().is_ok() {}

        light.tick(at(100));
        assert_eq!(light.state().current_values().red(), 0.0);
        assert!(EVENTS.is_empty());

        light.tick(at(300));
        assert_eq!(*light.state().current_values(), restore);
        assert_eq!(EVENTS.try_receive(), Ok(LightEvent::StateChanged(restore)));
        assert_eq!(EVENTS.try_receive(), Ok(LightEvent::TargetReached));
    }

    #[test]
    fn test_queued_calls_apply_on_tick() {
        static INTENTS: LightIntentChannel = LightIntentChannel::new();

        let mut light = Light::new(TestOutput::new(rgb_traits()), &LightConfig::new("queue"))
            .with_intents(INTENTS.receiver());
        light.setup(at(0));
        let writes = light.output().writes.get();

        assert!(
            INTENTS
                .try_send(LightCall::turn_on().with_transition_length(ms(0)))
                .is_ok()
        );
        light.tick(at(10));

        assert!(INTENTS.is_empty());
        assert!(light.state().current_values().is_on());
        assert_eq!(light.output().writes.get(), writes + 1);
    }

    #[test]
    fn test_idle_tick_does_not_write() {
        let mut light = Light::new(TestOutput::new(rgb_traits()), &LightConfig::new("idle"));
        light.setup(at(0));
        assert_eq!(light.output().writes.get(), 1);

        light.tick(at(10));
        light.tick(at(20));
        assert_eq!(light.output().writes.get(), 1);
    }

    #[test]
    fn test_frame_scheduler_pacing() {
        let light = Light::new(TestOutput::new(rgb_traits()), &LightConfig::new("paced"));
        let mut scheduler = FrameScheduler::with_frame_duration(light, ms(10));
        scheduler.setup(at(0));

        let result = scheduler.tick(at(0));
        assert_eq!(result.sleep_duration, ms(10));

        let result = scheduler.tick(at(15));
        assert_eq!(result.next_deadline, at(20));
        assert_eq!(result.sleep_duration, ms(5));

        // Too far behind, restart from now
        let result = scheduler.tick(at(100));
        assert_eq!(result.next_deadline, at(110));
        assert_eq!(result.sleep_duration, ms(10));
    }
}
