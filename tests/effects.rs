mod common;

mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use embassy_time::{Duration, Instant};
    use lumen_core::effect::{
        AutomationEffect, AutomationTrigger, FlameEffect, FlickerEffect, LambdaEffect, LambdaFn,
        PulseEffect, RandomEffect, StrobeEffect,
    };
    use lumen_core::rng::Prng;
    use lumen_core::{
        ColorMode, ColorValues, EffectContext, EffectSlot, Light, LightCall, LightConfig,
        LightEffect, LightTraits, Rgb,
    };

    use super::common::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn brightness_traits() -> LightTraits {
        LightTraits::new().with_mode(ColorMode::Brightness)
    }

    /// Shown and reported values plus everything an effect needs to run
    struct Bench {
        current: ColorValues,
        remote: ColorValues,
        traits: LightTraits,
        transformer_active: bool,
        rng: Prng,
    }

    impl Bench {
        fn new(traits: LightTraits, values: ColorValues) -> Self {
            Self {
                current: values,
                remote: values,
                traits,
                transformer_active: false,
                rng: Prng::new(42),
            }
        }

        fn run(&mut self, effect: &mut dyn LightEffect, now: Instant) -> Option<LightCall> {
            let mut ctx = EffectContext::new(
                now,
                &self.current,
                &self.remote,
                &self.traits,
                self.transformer_active,
                &mut self.rng,
            );
            effect.apply(&mut ctx)
        }
    }

    #[test]
    fn test_pulse_alternates() {
        let mut bench = Bench::new(brightness_traits(), on_values(ColorMode::Brightness, 1.0));
        let mut pulse = PulseEffect::new("Pulse").with_brightness_range(0.2, 0.9);
        pulse.start();

        let call = bench.run(&mut pulse, at(0)).expect("first step");
        assert_eq!(call.state(), Some(true));
        assert_eq!(call.brightness(), Some(0.9));
        assert_eq!(call.transition_length(), Some(ms(1000)));
        assert!(!call.is_publish());
        assert!(!call.is_save());

        assert!(bench.run(&mut pulse, at(500)).is_none());

        let call = bench.run(&mut pulse, at(1000)).expect("second step");
        assert_eq!(call.brightness(), Some(0.2));
    }

    #[test]
    fn test_random_picks_color_or_brightness() {
        let mut bench = Bench::new(rgb_traits(), on_values(ColorMode::Rgb, 1.0));
        let mut random = RandomEffect::new("Random");
        random.start();

        let call = bench.run(&mut random, at(0)).expect("first step");
        let (red, green, blue) = call.rgb();
        assert!(red.is_some() && green.is_some() && blue.is_some());
        assert_eq!(call.brightness(), None);
        assert_eq!(call.transition_length(), Some(ms(7500)));
        assert!(bench.run(&mut random, at(5000)).is_none());
        assert!(bench.run(&mut random, at(10_000)).is_some());

        let mut bench = Bench::new(brightness_traits(), on_values(ColorMode::Brightness, 1.0));
        random.start();
        let call = bench.run(&mut random, at(0)).expect("first step");
        assert!(call.brightness().is_some());
        assert_eq!(call.rgb(), (None, None, None));
    }

    #[test]
    fn test_strobe_loops() {
        let mut bench = Bench::new(brightness_traits(), on_values(ColorMode::Brightness, 1.0));
        let mut strobe = StrobeEffect::new("Strobe");
        strobe.start();

        let call = bench.run(&mut strobe, at(0)).expect("first step");
        assert_eq!(call.brightness(), Some(1.0));
        assert_eq!(strobe.current_step(), Some(0));

        assert!(bench.run(&mut strobe, at(200)).is_none());

        let call = bench.run(&mut strobe, at(500)).expect("second step");
        assert_eq!(call.state(), Some(true));
        assert_eq!(call.brightness(), Some(0.0));
        assert_eq!(strobe.current_step(), Some(1));

        bench.run(&mut strobe, at(1000)).expect("wraps around");
        assert_eq!(strobe.current_step(), Some(0));
    }

    #[test]
    fn test_strobe_without_looping_stops() {
        let mut bench = Bench::new(brightness_traits(), on_values(ColorMode::Brightness, 1.0));
        let mut strobe = StrobeEffect::new("Strobe").with_looping(false);
        strobe.start();

        assert!(bench.run(&mut strobe, at(0)).is_some());
        assert!(bench.run(&mut strobe, at(500)).is_some());
        assert!(bench.run(&mut strobe, at(1000)).is_none());
        assert_eq!(strobe.current_step(), Some(1));
    }

    #[test]
    fn test_flicker_stays_close() {
        let mut values = on_values(ColorMode::Rgb, 0.5);
        values.set_rgb(1.0, 0.5, 0.25);
        let mut bench = Bench::new(rgb_traits(), values);
        let mut flicker = FlickerEffect::new("Flicker");

        for tick in 0..100 {
            let call = bench.run(&mut flicker, at(tick * 16)).expect("every tick");
            let brightness = call.brightness().expect("brightness set");
            assert!((brightness - 0.5).abs() <= 0.015 + 1e-6);
            assert_eq!(call.transition_length(), Some(ms(0)));
            assert!(!call.is_publish());
        }
    }

    #[test]
    fn test_lambda_initial_run() {
        let runs = Rc::new(Cell::new(0u32));
        let initial_runs = Rc::new(Cell::new(0u32));
        let step: LambdaFn = {
            let runs = runs.clone();
            let initial_runs = initial_runs.clone();
            Box::new(move |_ctx: &mut EffectContext<'_>, initial_run: bool| {
                runs.set(runs.get() + 1);
                if initial_run {
                    initial_runs.set(initial_runs.get() + 1);
                }
                None
            })
        };
        let mut lambda = LambdaEffect::new("Lambda", ms(100), step);
        let mut bench = Bench::new(rgb_traits(), on_values(ColorMode::Rgb, 1.0));

        lambda.start();
        bench.run(&mut lambda, at(0));
        bench.run(&mut lambda, at(50));
        bench.run(&mut lambda, at(100));
        assert_eq!(runs.get(), 2);
        assert_eq!(initial_runs.get(), 1);

        lambda.stop();
        lambda.start();
        bench.run(&mut lambda, at(110));
        assert_eq!(initial_runs.get(), 2);
    }

    struct Sequence {
        running: Rc<Cell<bool>>,
        triggers: Rc<Cell<u32>>,
        stops: Rc<Cell<u32>>,
    }

    impl AutomationTrigger for Sequence {
        fn is_running(&self) -> bool {
            self.running.get()
        }

        fn trigger(&mut self, ctx: &mut EffectContext<'_>) -> Option<LightCall> {
            self.running.set(true);
            self.triggers.set(self.triggers.get() + 1);
            Some(ctx.turn_on())
        }

        fn stop(&mut self) {
            self.running.set(false);
            self.stops.set(self.stops.get() + 1);
        }
    }

    #[test]
    fn test_automation_retriggers_when_idle() {
        let running = Rc::new(Cell::new(false));
        let triggers = Rc::new(Cell::new(0));
        let stops = Rc::new(Cell::new(0));
        let mut automation = AutomationEffect::new(
            "Automation",
            Box::new(Sequence {
                running: running.clone(),
                triggers: triggers.clone(),
                stops: stops.clone(),
            }),
        );
        let mut bench = Bench::new(rgb_traits(), on_values(ColorMode::Rgb, 1.0));

        assert!(bench.run(&mut automation, at(0)).is_some());
        assert!(bench.run(&mut automation, at(10)).is_none());
        assert_eq!(triggers.get(), 1);

        running.set(false);
        assert!(bench.run(&mut automation, at(20)).is_some());
        assert_eq!(triggers.get(), 2);

        automation.stop();
        assert_eq!(stops.get(), 1);
        assert!(!running.get());
    }

    #[test]
    fn test_flame_level_zero_is_baseline() {
        let mut bench = Bench::new(brightness_traits(), on_values(ColorMode::Brightness, 0.8));
        let mut flame = FlameEffect::candle("Candle");
        flame.start();

        // Baseline pass, a candle needs no adjustment
        assert!(bench.run(&mut flame, at(0)).is_none());
        assert_eq!(flame.baseline_brightness(), 0.8);

        flame.set_flicker_brightness_levels(0);
        assert_eq!(flame.flicker_bright_brightness(), 0.8);
        assert_eq!(flame.flicker_dim_brightness(), 0.8);

        for tick in 1..500 {
            let call = bench.run(&mut flame, at(tick * 100)).expect("steady flicker");
            let brightness = call.brightness().expect("brightness set");
            assert!((0.0..=0.8).contains(&brightness));
            assert!(call.transition_length().expect("transition set") >= ms(90));
            if flame.flicker_state() == 0 {
                assert_eq!(flame.flicker_bright_brightness(), flame.baseline_brightness());
                assert_eq!(flame.flicker_dim_brightness(), flame.baseline_brightness());
            }
        }
    }

    #[test]
    fn test_fireplace_dims_baseline() {
        let mut bench = Bench::new(brightness_traits(), on_values(ColorMode::Brightness, 1.0));
        let mut flame = FlameEffect::fireplace("Fireplace");
        flame.start();

        let call = bench.run(&mut flame, at(0)).expect("baseline adjustment");
        assert_eq!(call.brightness(), Some(1.0 - 0.15));
        assert_eq!(flame.baseline_brightness(), 1.0 - 0.15);

        let (min, max) = flame.brightness_range();
        assert_eq!(min, flame.baseline_brightness());
        assert!((max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_flame_custom_colors() {
        let mut bench = Bench::new(rgb_traits(), on_values(ColorMode::Rgb, 0.3));
        let mut flame = FlameEffect::candle("Candle")
            .with_colors(vec![Rgb::new(255, 0, 0), Rgb::new(255, 255, 0)]);
        flame.start();

        let call = bench.run(&mut flame, at(0)).expect("color setup");
        assert_eq!(call.color_mode(), Some(ColorMode::Rgb));
        assert_eq!(call.brightness(), Some(1.0));
        assert_eq!(call.rgb(), (Some(1.0), Some(0.0), Some(0.0)));

        let call = bench.run(&mut flame, at(100)).expect("steady flicker");
        let (red, _, blue) = call.rgb();
        assert_eq!(red, Some(1.0));
        assert_eq!(blue, Some(0.0));
    }

    #[test]
    fn test_flame_waits_for_transformer() {
        let mut bench = Bench::new(brightness_traits(), on_values(ColorMode::Brightness, 1.0));
        bench.transformer_active = true;
        let mut flame = FlameEffect::fireplace("Fireplace");
        flame.start();

        assert!(bench.run(&mut flame, at(0)).is_none());
    }

    #[test]
    fn test_slot_dispatch() {
        let slot = EffectSlot::from(PulseEffect::new("Slow Pulse"));
        assert_eq!(slot.name(), "Slow Pulse");
        assert!(matches!(slot, EffectSlot::Pulse(_)));
    }

    #[test]
    fn test_effect_runs_on_tick() {
        let config = LightConfig::new("strip").with_default_transition_length(ms(0));
        let mut light = Light::new(TestOutput::new(brightness_traits()), &config);
        let index = light
            .state_mut()
            .add_effect(PulseEffect::new("Pulse").with_brightness_range(0.0, 0.6));
        light.setup(at(0));
        turn_on_now(light.state_mut(), 1.0);

        light.perform(LightCall::new().with_effect(index), at(0));
        light.tick(at(10));

        assert_eq!(light.state().effect_name(), "Pulse");
        assert!(light.state().is_transformer_active());
        assert_eq!(light.state().remote_values().brightness(), 0.6);
        assert_eq!(light.state().active_effect_index(), index);
    }
}
