mod common;

mod tests {
    use embassy_time::Duration;
    use lumen_core::transformer::{FlashTransformer, TransitionTransformer, default_transition};
    use lumen_core::{ColorMode, ColorValues, Transformer};

    use super::common::*;

    const EPSILON: f32 = 1e-4;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn off_values() -> ColorValues {
        let mut values = on_values(ColorMode::Brightness, 0.8);
        values.set_state(false);
        values
    }

    #[test]
    fn test_transition_progress() {
        let begin = on_values(ColorMode::Brightness, 0.0);
        let end = on_values(ColorMode::Brightness, 1.0);
        let transition = TransitionTransformer::new(begin, end, at(1000), ms(1000));

        assert_eq!(transition.progress(at(1000)), 0.0);
        assert!((transition.progress(at(1500)) - 0.5).abs() < EPSILON);
        assert!((transition.values(at(1500)).brightness() - 0.5).abs() < EPSILON);
        assert!(!transition.is_finished(at(1999)));
        assert!(transition.is_finished(at(2000)));
        assert_eq!(transition.values(at(2000)), end);
    }

    #[test]
    fn test_zero_length_transition_is_finished() {
        let begin = on_values(ColorMode::Brightness, 0.2);
        let end = on_values(ColorMode::Brightness, 0.9);
        let transition = TransitionTransformer::new(begin, end, at(0), ms(0));

        assert!(transition.is_finished(at(0)));
        assert_eq!(transition.values(at(0)), end);
    }

    #[test]
    fn test_turning_on_fades_from_zero() {
        let end = on_values(ColorMode::Brightness, 0.8);
        let transition = TransitionTransformer::new(off_values(), end, at(0), ms(1000));

        let start = transition.values(at(0));
        assert!(start.is_on());
        assert_eq!(start.brightness(), 0.0);

        let mid = transition.values(at(500));
        assert!(mid.is_on());
        assert!((mid.brightness() - 0.4).abs() < EPSILON);
    }

    #[test]
    fn test_turning_off_stays_on_until_done() {
        let begin = on_values(ColorMode::Brightness, 0.8);
        let transition = TransitionTransformer::new(begin, off_values(), at(0), ms(1000));

        let mid = transition.values(at(500));
        assert!(mid.is_on());
        assert!((mid.brightness() - 0.4).abs() < EPSILON);

        let end = transition.values(at(1000));
        assert!(!end.is_on());
    }

    #[test]
    fn test_flash_without_fade() {
        let begin = on_values(ColorMode::Brightness, 0.3);
        let target = on_values(ColorMode::Brightness, 1.0);
        let flash = FlashTransformer::new(begin, target, begin, at(0), ms(500), ms(0));

        assert_eq!(flash.values(at(0)), target);
        assert_eq!(flash.values(at(499)), target);
        assert_eq!(flash.values(at(500)), begin);
        assert!(flash.is_finished(at(500)));
    }

    #[test]
    fn test_flash_fades_in_and_out() {
        let begin = on_values(ColorMode::Brightness, 0.2);
        let target = on_values(ColorMode::Brightness, 1.0);
        let flash = FlashTransformer::new(begin, target, begin, at(0), ms(1000), ms(200));

        assert!((flash.values(at(100)).brightness() - 0.6).abs() < EPSILON);
        assert_eq!(flash.values(at(500)), target);
        assert!((flash.values(at(900)).brightness() - 0.6).abs() < EPSILON);
        assert_eq!(flash.values(at(1000)), begin);
    }

    #[test]
    fn test_flash_fade_is_limited_to_half() {
        let begin = on_values(ColorMode::Brightness, 0.0);
        let target = on_values(ColorMode::Brightness, 1.0);
        let flash = FlashTransformer::new(begin, target, begin, at(0), ms(400), ms(1000));

        // Fade in over 200 ms, then straight into the fade out
        assert!((flash.values(at(100)).brightness() - 0.5).abs() < EPSILON);
        assert!((flash.values(at(300)).brightness() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_transformer_end_values() {
        let begin = on_values(ColorMode::Brightness, 0.2);
        let target = on_values(ColorMode::Brightness, 1.0);
        let restore = on_values(ColorMode::Brightness, 0.5);

        let transition = default_transition(begin, target, at(0), ms(100));
        assert_eq!(transition.begin_values(), begin);
        assert_eq!(transition.target_values(), target);
        assert_eq!(transition.remote_values(), target);
        assert!(!transition.publish_at_end());

        let flash = Transformer::Flash(FlashTransformer::new(
            begin,
            target,
            restore,
            at(0),
            ms(100),
            ms(0),
        ));
        assert_eq!(flash.target_values(), target);
        assert_eq!(flash.end_values(), restore);
        assert_eq!(flash.remote_values(), restore);
        assert!(flash.publish_at_end());
    }
}
