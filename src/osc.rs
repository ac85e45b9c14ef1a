// jdw-billboarding
// Copyright (C) 2026  Johan Wettergren
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Bundle assembly for the jdw-sc engine.
//!
//! The engine accepts self-describing bundles: the first message in every
//! bundle is a `/bundle_info` message whose single string argument names the
//! bundle kind, optionally followed by a kind-specific info message and a
//! nested bundle with the actual content. This module provides constructors
//! for each bundle kind the engine understands:
//!
//! * `"update_queue"` - replace one sequencer queue ([`update_queue_bundle`])
//! * `"batch_update_queues"` - replace several queues at once
//!   ([`batch_update_queues_bundle`])
//! * `"nrt_record"` - an offline render request ([`nrt_record_bundle`])
//! * `"nrt_preload"` - resources to load before an offline render
//!   ([`nrt_preload_bundle`], sliced into batches by [`preload_batches`])
//! * `"timed_msg"` - a single scheduled packet ([`timed_bundle`])
//! * `"batch-send"` - arbitrary packets delivered in one go
//!   ([`batch_send_bundle`])
//!
//! Assembly is pure: the only failures are caller contract violations such
//! as an empty queue id, reported as [`Error`] before any bundle is built.

use rosc::{OscBundle, OscMessage, OscPacket, OscTime, OscType};
use thiserror::Error;

/// A specialized [`Result`] type for bundle assembly.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type returned when a bundle constructor is handed malformed
/// input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("queue id must not be empty")]
    EmptyQueueId,
    #[error("output file name must not be empty")]
    EmptyFileName,
    #[error("preload batch size must not be zero")]
    ZeroBatchSize,
}

/// The OSC "immediately" time tag carried by every assembled bundle. Timing
/// lives inside the payload (latency arguments and `timed_msg` wrappers),
/// not in OSC time tags.
pub const IMMEDIATELY: OscTime = OscTime {
    seconds: 0,
    fractional: 1,
};

/// A chaining builder for OSC messages.
///
/// ```
/// use jdw_billboarding::osc::Message;
///
/// let message = Message::addr("/free_notes").arg("^effect_(.*)".to_owned()).build();
/// assert_eq!("/free_notes", message.addr);
/// ```
pub struct Message(OscMessage);

impl Message {
    pub fn addr(addr: impl Into<String>) -> Message {
        Message(OscMessage {
            addr: addr.into(),
            args: Vec::new(),
        })
    }

    pub fn arg<T: Into<OscType>>(mut self, arg: T) -> Message {
        self.0.args.push(arg.into());
        self
    }

    pub fn args<I, T>(mut self, args: I) -> Message
    where
        I: IntoIterator<Item = T>,
        T: Into<OscType>,
    {
        self.0.args.extend(args.into_iter().map(T::into));
        self
    }

    pub fn build(self) -> OscMessage {
        self.0
    }

    pub fn into_packet(self) -> OscPacket {
        OscPacket::Message(self.0)
    }
}

fn bundle(content: Vec<OscPacket>) -> OscBundle {
    OscBundle {
        timetag: IMMEDIATELY,
        content,
    }
}

fn bundle_info(kind: &str) -> OscPacket {
    Message::addr("/bundle_info").arg(kind.to_owned()).into_packet()
}

/// Wraps preload messages (sample and synthdef loads) for delivery ahead of
/// a non-real-time render.
pub fn nrt_preload_bundle(content: Vec<OscPacket>) -> OscBundle {
    let mut packets = vec![bundle_info("nrt_preload")];
    packets.extend(content);
    bundle(packets)
}

/// Slices a preload sequence into preload bundles of at most `batch_size`
/// messages each, preserving input order across and within batches. The
/// engine chokes on oversized packets, which is what bounds the batches.
///
/// # Errors
///
/// Returns an error if `batch_size` is zero.
pub fn preload_batches(content: Vec<OscPacket>, batch_size: usize) -> Result<Vec<OscBundle>> {
    if batch_size == 0 {
        return Err(Error::ZeroBatchSize);
    }
    let mut batches = Vec::with_capacity((content.len() + batch_size - 1) / batch_size);
    let mut current = Vec::with_capacity(batch_size);
    for packet in content {
        current.push(packet);
        if current.len() == batch_size {
            batches.push(nrt_preload_bundle(std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        batches.push(nrt_preload_bundle(current));
    }
    Ok(batches)
}

/// Wraps a track's timed messages into a queue replacement for the live
/// sequencer.
///
/// # Errors
///
/// Returns an error if `queue_id` is empty.
pub fn update_queue_bundle(queue_id: &str, timed_messages: Vec<OscPacket>) -> Result<OscBundle> {
    if queue_id.is_empty() {
        return Err(Error::EmptyQueueId);
    }
    Ok(bundle(vec![
        bundle_info("update_queue"),
        Message::addr("/update_queue_info")
            .arg(queue_id.to_owned())
            .into_packet(),
        OscPacket::Bundle(bundle(timed_messages)),
    ]))
}

/// Wraps several queue update bundles into one batch. `stop_missing` tells
/// the sequencer to clear any queue absent from the batch; it is serialized
/// as 1 or 0.
pub fn batch_update_queues_bundle(queues: Vec<OscBundle>, stop_missing: bool) -> OscBundle {
    bundle(vec![
        bundle_info("batch_update_queues"),
        Message::addr("/batch_update_queues_info")
            .arg(if stop_missing { 1 } else { 0 })
            .into_packet(),
        OscPacket::Bundle(bundle(queues.into_iter().map(OscPacket::Bundle).collect())),
    ])
}

/// Wraps a complete timed note sequence into an offline render request,
/// writing the result to `file_name` on the engine host.
///
/// # Errors
///
/// Returns an error if `file_name` is empty.
pub fn nrt_record_bundle(
    sequence: Vec<OscPacket>,
    file_name: &str,
    end_time: f32,
    bpm: f32,
) -> Result<OscBundle> {
    if file_name.is_empty() {
        return Err(Error::EmptyFileName);
    }
    Ok(bundle(vec![
        bundle_info("nrt_record"),
        Message::addr("/nrt_record_info")
            .arg(bpm)
            .arg(file_name.to_owned())
            .arg(end_time)
            .into_packet(),
        OscPacket::Bundle(bundle(sequence)),
    ]))
}

/// Wraps arbitrary packets for one-shot delivery.
pub fn batch_send_bundle(packets: Vec<OscPacket>) -> OscBundle {
    let mut content = vec![bundle_info("batch-send")];
    content.extend(packets);
    bundle(content)
}

/// Schedules a single packet at `time`, in beats from the start of its
/// sequence. The engine reads the time as a decimal string.
pub fn timed_bundle(time: f32, packet: OscPacket) -> OscBundle {
    bundle(vec![
        bundle_info("timed_msg"),
        Message::addr("/timed_msg_info")
            .arg(time.to_string())
            .into_packet(),
        packet,
    ])
}

/// Frees every active note whose external id matches the given regex, for
/// example `"^effect_(.*)"` to clear all effects before reconfiguring.
pub fn free_notes(pattern: &str) -> OscMessage {
    Message::addr("/free_notes").arg(pattern.to_owned()).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_packets(count: usize) -> Vec<OscPacket> {
        (0..count)
            .map(|n| Message::addr(format!("/msg_{}", n)).into_packet())
            .collect()
    }

    fn info_kind(packet: &OscPacket) -> &str {
        match packet {
            OscPacket::Message(message) => match &message.args[0] {
                OscType::String(kind) => kind,
                other => panic!("unexpected bundle info argument: {:?}", other),
            },
            OscPacket::Bundle(_) => panic!("expected a bundle info message"),
        }
    }

    #[test]
    fn preload_batches_are_ceiling_sliced() {
        let batches = preload_batches(numbered_packets(23), 10).unwrap();
        assert_eq!(vec![11, 11, 4], batches
            .iter()
            .map(|batch| batch.content.len())
            .collect::<Vec<_>>());

        // Input order survives across and within batches.
        let mut replayed = Vec::new();
        for batch in &batches {
            assert_eq!("nrt_preload", info_kind(&batch.content[0]));
            replayed.extend(batch.content[1..].iter().cloned());
        }
        assert_eq!(numbered_packets(23), replayed);
    }

    #[test]
    fn short_preload_sequence_is_a_single_batch() {
        let batches = preload_batches(numbered_packets(3), 10).unwrap();
        assert_eq!(1, batches.len());
        assert_eq!(4, batches[0].content.len());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert_eq!(
            Err(Error::ZeroBatchSize),
            preload_batches(numbered_packets(3), 0)
        );
    }

    #[test]
    fn queue_update_nests_its_messages() {
        let messages = numbered_packets(2);
        let queue = update_queue_bundle("t1", messages.clone()).unwrap();

        assert_eq!(IMMEDIATELY, queue.timetag);
        assert_eq!(3, queue.content.len());
        assert_eq!("update_queue", info_kind(&queue.content[0]));
        assert_eq!(
            Message::addr("/update_queue_info")
                .arg("t1".to_owned())
                .into_packet(),
            queue.content[1]
        );
        match &queue.content[2] {
            OscPacket::Bundle(inner) => assert_eq!(messages, inner.content),
            OscPacket::Message(message) => panic!("expected nested bundle, got {:?}", message),
        }
    }

    #[test]
    fn empty_queue_id_is_rejected() {
        assert_eq!(
            Err(Error::EmptyQueueId),
            update_queue_bundle("", numbered_packets(1))
        );
    }

    #[test]
    fn batch_queue_update_serializes_the_stop_flag() {
        let queues = vec![
            update_queue_bundle("t1", numbered_packets(1)).unwrap(),
            update_queue_bundle("t2", numbered_packets(1)).unwrap(),
        ];

        let batch = batch_update_queues_bundle(queues.clone(), true);
        assert_eq!("batch_update_queues", info_kind(&batch.content[0]));
        assert_eq!(
            Message::addr("/batch_update_queues_info")
                .arg(1)
                .into_packet(),
            batch.content[1]
        );
        match &batch.content[2] {
            OscPacket::Bundle(inner) => assert_eq!(
                queues.into_iter().map(OscPacket::Bundle).collect::<Vec<_>>(),
                inner.content
            ),
            OscPacket::Message(message) => panic!("expected nested bundle, got {:?}", message),
        }

        let batch = batch_update_queues_bundle(Vec::new(), false);
        assert_eq!(
            Message::addr("/batch_update_queues_info")
                .arg(0)
                .into_packet(),
            batch.content[1]
        );
    }

    #[test]
    fn record_bundle_carries_the_render_info() {
        let sequence = numbered_packets(2);
        let record = nrt_record_bundle(sequence.clone(), "take1.wav", 16.0, 120.0).unwrap();

        assert_eq!("nrt_record", info_kind(&record.content[0]));
        assert_eq!(
            Message::addr("/nrt_record_info")
                .arg(120.0f32)
                .arg("take1.wav".to_owned())
                .arg(16.0f32)
                .into_packet(),
            record.content[1]
        );
        match &record.content[2] {
            OscPacket::Bundle(inner) => assert_eq!(sequence, inner.content),
            OscPacket::Message(message) => panic!("expected nested bundle, got {:?}", message),
        }
    }

    #[test]
    fn empty_file_name_is_rejected() {
        assert_eq!(
            Err(Error::EmptyFileName),
            nrt_record_bundle(numbered_packets(1), "", 16.0, 120.0)
        );
    }

    #[test]
    fn timed_wrapper_stringifies_the_time() {
        let packet = Message::addr("/note_on").into_packet();
        let timed = timed_bundle(0.5, packet.clone());

        assert_eq!("timed_msg", info_kind(&timed.content[0]));
        assert_eq!(
            Message::addr("/timed_msg_info")
                .arg("0.5".to_owned())
                .into_packet(),
            timed.content[1]
        );
        assert_eq!(packet, timed.content[2]);
    }

    #[test]
    fn batch_send_keeps_packet_order() {
        let packets = numbered_packets(3);
        let batch = batch_send_bundle(packets.clone());
        assert_eq!("batch-send", info_kind(&batch.content[0]));
        assert_eq!(packets, batch.content[1..].to_vec());
    }

    #[test]
    fn free_notes_takes_an_id_pattern() {
        let message = free_notes("^effect_(.*)");
        assert_eq!("/free_notes", message.addr);
        assert_eq!(
            vec![OscType::String("^effect_(.*)".to_owned())],
            message.args
        );
    }
}
