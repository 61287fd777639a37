#![no_main]

use voxschem::ConversionOptions;

/// Larger models are skipped to keep memory use reasonable.
const MAX_VOLUME: usize = 1 << 20;

libfuzzer_sys::fuzz_target!(|input: &[u8]| test(input));

fn test(input: &[u8]) {
    let Ok(scene) = voxschem::decode_bytes(input) else {
        return;
    };
    let options = ConversionOptions::new();
    for (index, model) in scene.models().iter().enumerate() {
        if model.extent().volume().is_none_or(|volume| volume > MAX_VOLUME) {
            continue;
        }
        if let Ok(arrays) = scene.block_arrays(index, &options) {
            assert_eq!(arrays.block_ids().len(), arrays.block_meta().len());
            let mut bytes = Vec::new();
            scene.write_schematic(index, &mut bytes, &options).unwrap();
        }
    }
}
