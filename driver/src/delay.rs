use embedded_hal::delay::DelayNs;
use std::thread::sleep;
use std::time::Duration;

/// Blocking [DelayNs] backed by [std::thread::sleep].
///
/// The OS scheduler may stretch short sleeps considerably; the HD44780 only has minimum hold
/// times, so that is harmless.
#[derive(Copy, Clone, Debug, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        sleep(Duration::from_nanos(ns as u64));
    }

    fn delay_us(&mut self, us: u32) {
        sleep(Duration::from_micros(us as u64));
    }

    fn delay_ms(&mut self, ms: u32) {
        sleep(Duration::from_millis(ms as u64));
    }
}

/// Sleeps for `duration` on any [DelayNs].
pub(crate) fn hold<D: DelayNs + ?Sized>(delay: &mut D, duration: Duration) {
    if duration.is_zero() {
        return;
    }
    match u32::try_from(duration.as_nanos()) {
        Ok(ns) => delay.delay_ns(ns),
        Err(_) => delay.delay_ms(u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)),
    }
}
