/// How a value gets from the previous event to this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ramp {
    /// Jump to the value at the event time.
    Set,
    /// Straight line from the previous event.
    Linear,
    /// Constant-ratio curve from the previous event.
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationEvent {
    pub time: f64,
    pub value: f32,
    pub ramp: Ramp,
}

/// A schedule of gain values over absolute clock time.
///
/// Events are kept sorted by time. Before the first event the envelope sits at
/// its default value, after the last one it holds the last value. A ramp event
/// starts from the previous event's time and value.
#[derive(Debug, Clone)]
pub struct GainEnvelope {
    default_value: f32,
    events: Vec<AutomationEvent>,
}

impl GainEnvelope {
    pub fn new(default_value: f32) -> Self {
        Self {
            default_value,
            events: Vec::new(),
        }
    }

    pub fn set_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent {
            time,
            value,
            ramp: Ramp::Set,
        });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent {
            time,
            value,
            ramp: Ramp::Linear,
        });
    }

    /// Callers must pass a positive `value`; an exponential curve cannot reach zero.
    pub fn exponential_ramp_to_value_at_time(&mut self, value: f32, time: f64) {
        self.insert(AutomationEvent {
            time,
            value,
            ramp: Ramp::Exponential,
        });
    }

    /// Drop every event at or after `time`.
    pub fn cancel_scheduled_values(&mut self, time: f64) {
        self.events.retain(|event| event.time < time);
    }

    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Time after which the value no longer changes.
    pub fn settled_after(&self) -> f64 {
        self.events.last().map_or(0.0, |event| event.time)
    }

    pub fn value_at(&self, time: f64) -> f32 {
        let next_index = self.events.partition_point(|event| event.time <= time);

        let (start_time, start_value) = match next_index.checked_sub(1) {
            Some(previous) => (self.events[previous].time, self.events[previous].value),
            None => (0.0, self.default_value),
        };

        let Some(next) = self.events.get(next_index) else {
            return start_value;
        };

        let span = next.time - start_time;
        if span <= 0.0 {
            return start_value;
        }
        let progress = ((time - start_time) / span).clamp(0.0, 1.0);

        match next.ramp {
            Ramp::Set => start_value,
            Ramp::Linear => start_value + (next.value - start_value) * progress as f32,
            Ramp::Exponential => {
                // Undefined across zero or a sign change: hold until the event.
                if start_value == 0.0 || (start_value > 0.0) != (next.value > 0.0) {
                    start_value
                } else {
                    let ratio = f64::from(next.value) / f64::from(start_value);
                    (f64::from(start_value) * ratio.powf(progress)) as f32
                }
            }
        }
    }

    fn insert(&mut self, event: AutomationEvent) {
        let index = self.events.partition_point(|existing| existing.time <= event.time);
        self.events.insert(index, event);
    }
}

impl Default for GainEnvelope {
    fn default() -> Self {
        Self::new(1.0)
    }
}
