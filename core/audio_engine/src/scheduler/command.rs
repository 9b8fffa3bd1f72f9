use rtrb::{Consumer, Producer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerCommand {
    /// Start (or resume) advancing the timeline.
    Play,
    /// Silence everything and drop all pending voices.
    Stop,
}

pub type SchedulerCommandConsumer = Consumer<SchedulerCommand>;
pub type SchedulerCommandProducer = Producer<SchedulerCommand>;
