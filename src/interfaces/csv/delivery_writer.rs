use crate::domain::message::BufferedMessage;
use crate::error::Result;
use std::io::Write;

/// Writes host deliveries as CSV (`target,method,body`).
pub struct DeliveryWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> DeliveryWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_deliveries<I>(&mut self, deliveries: I) -> Result<()>
    where
        I: IntoIterator<Item = BufferedMessage>,
    {
        for delivery in deliveries {
            self.writer.serialize(delivery)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
