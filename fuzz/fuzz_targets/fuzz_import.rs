#![no_main]

use std::sync::Arc;

use voxschem::file::NonDiskFile;

libfuzzer_sys::fuzz_target!(|input: &[u8]| test(input));

fn test(input: &[u8]) {
    let input = input.to_vec();
    let _result = voxschem::decode_file(Arc::new(NonDiskFile::from_name_and_data_source(
        String::new(),
        move || Ok(input.clone()),
    )));
}
