use jdw_billboarding::{
    convert::{ElementConverter, InstrumentKind, ScaleContext},
    notation::{self, ResolvedElement},
    osc,
};
use pretty_assertions::assert_eq;
use rosc::{OscPacket, OscType};

// Exercises the full path a live update takes: JSON handoff from the
// notation parser, per-element conversion, timed wrapping, and queue
// bundle assembly.
#[test]
fn converts_a_parsed_track_into_a_queue_update() {
    let json = r#"[
        {"prefix": "", "suffix": "", "index": 0, "args": [["sus", 1.0]]},
        {"prefix": "", "suffix": "x", "index": 0},
        {"prefix": "", "suffix": ".", "index": 0},
        {"prefix": "", "suffix": "@lead", "index": 0}
    ]"#;
    let elements = notation::elements_from_json(json).unwrap();

    let mut converter = ElementConverter::new("brute", "t1", InstrumentKind::Synth)
        .scale(ScaleContext::new("c", "maj", 0));

    let packets = elements
        .iter()
        .filter_map(|element| converter.convert(element, 0))
        .map(|message| OscPacket::Bundle(osc::timed_bundle(1.0, message.into_packet())))
        .collect::<Vec<_>>();

    // The "." element is dropped entirely.
    assert_eq!(3, packets.len());

    let queue = osc::update_queue_bundle("t1", packets).unwrap();
    let batch = osc::batch_update_queues_bundle(vec![queue], true);

    assert_eq!(
        vec![
            "/bundle_info",
            "/batch_update_queues_info",
            "/bundle_info",
            "/update_queue_info",
            "/bundle_info",
            "/timed_msg_info",
            "/note_on_timed",
            "/bundle_info",
            "/timed_msg_info",
            "/empty_msg",
            "/bundle_info",
            "/timed_msg_info",
            "/note_modify",
        ],
        collect_addresses(&OscPacket::Bundle(batch))
    );
}

#[test]
fn slices_preload_and_wraps_an_offline_render() {
    let preload = (0..23)
        .map(|buffer_index| {
            osc::Message::addr("/load_sample")
                .arg(format!("sample_{}.wav", buffer_index))
                .arg(buffer_index)
                .into_packet()
        })
        .collect::<Vec<_>>();

    let batches = osc::preload_batches(preload, 10).unwrap();
    assert_eq!(
        vec![11, 11, 4],
        batches
            .iter()
            .map(|batch| batch.content.len())
            .collect::<Vec<_>>()
    );

    let mut converter = ElementConverter::new("drums", "t4", InstrumentKind::Sampler);
    let sequence = (0..4)
        .map(|beat| {
            let element = ResolvedElement::new("sn", "", beat);
            let message = converter.convert(&element, 0).unwrap();
            OscPacket::Bundle(osc::timed_bundle(beat as f32, message.into_packet()))
        })
        .collect::<Vec<_>>();

    let record = osc::nrt_record_bundle(sequence, "take1.wav", 4.0, 120.0).unwrap();
    assert_eq!(
        osc::Message::addr("/nrt_record_info")
            .arg(120.0f32)
            .arg("take1.wav".to_owned())
            .arg(4.0f32)
            .into_packet(),
        record.content[1]
    );
    assert_eq!(
        vec![
            "/bundle_info",
            "/nrt_record_info",
            "/bundle_info",
            "/timed_msg_info",
            "/play_sample",
            "/bundle_info",
            "/timed_msg_info",
            "/play_sample",
            "/bundle_info",
            "/timed_msg_info",
            "/play_sample",
            "/bundle_info",
            "/timed_msg_info",
            "/play_sample",
        ],
        collect_addresses(&OscPacket::Bundle(record))
    );
}

// Drone tracks pin every element to one voice and reconfigure it in place.
#[test]
fn drone_reconfiguration_targets_a_fixed_voice() {
    let mut converter = ElementConverter::new("pad", "t2", InstrumentKind::Drone)
        .external_id_override("effect_pad_0");

    let elements = vec![
        ResolvedElement::new("", "", 0).arg("amp", 0.4),
        ResolvedElement::new("", "", 2).arg("amp", 0.6),
    ];

    let messages = elements
        .iter()
        .filter_map(|element| converter.convert(element, 0))
        .map(|message| message.message)
        .collect::<Vec<_>>();

    for message in &messages {
        assert_eq!("/note_modify", message.addr);
        assert_eq!(OscType::String("effect_pad_0".to_owned()), message.args[0]);
    }

    // A configuration pass clears old effect voices first.
    let clear = osc::free_notes("^effect_(.*)");
    let config = osc::batch_send_bundle(
        std::iter::once(OscPacket::Message(clear))
            .chain(messages.into_iter().map(OscPacket::Message))
            .collect(),
    );
    assert_eq!(
        vec!["/bundle_info", "/free_notes", "/note_modify", "/note_modify"],
        collect_addresses(&OscPacket::Bundle(config))
    );
}

fn collect_addresses(packet: &OscPacket) -> Vec<&str> {
    match packet {
        OscPacket::Message(message) => vec![message.addr.as_str()],
        OscPacket::Bundle(bundle) => bundle
            .content
            .iter()
            .flat_map(collect_addresses)
            .collect(),
    }
}
