mod common;

use common::*;
use cryptoinfra::crypto::Direction;
use rand::rngs::OsRng;
use std::io::Write;

#[test]
fn test_cbc_130_bytes() {
    init_tracing();
    let recipient = Recipient::generate("curve25519");
    let plaintext = sample_plaintext(130);
    let container = encrypt(&recipient, "aes-128/cbc", &plaintext);

    let (preamble, records) = parse_container(&container);
    assert_eq!(preamble.pk_algo, "curve25519");
    assert_eq!(preamble.encoding, "aes-128/cbc");
    assert_eq!(preamble.opaque.len(), 32);

    assert_eq!(records.len(), 2);
    assert!(!records[0].last);
    assert!(records[0].nonce.is_empty());
    assert_eq!(records[0].data.len(), 128);
    assert!(records[1].last);
    assert_eq!(records[1].data.len(), 16);

    assert_eq!(decrypt(&recipient, &container).unwrap(), plaintext);
}

#[test]
fn test_empty_aead_stream() {
    let recipient = Recipient::generate("fips_p256");
    let container = encrypt(&recipient, "aes-256/gcm", b"");

    let (preamble, records) = parse_container(&container);
    assert_eq!(preamble.opaque.len(), 65);
    assert_eq!(records.len(), 1);
    assert!(records[0].last);
    assert_eq!(records[0].nonce.len(), 12);
    assert_eq!(records[0].data.len(), 16);

    assert!(decrypt(&recipient, &container).unwrap().is_empty());
}

#[test]
fn test_empty_block_stream_is_one_padded_block() {
    let recipient = Recipient::generate("curve25519");
    let container = encrypt(&recipient, "aes-256/cbc", b"");
    let (_, records) = parse_container(&container);
    assert_eq!(records.len(), 1);
    assert!(records[0].last);
    assert_eq!(records[0].data.len(), 16);
    assert!(decrypt(&recipient, &container).unwrap().is_empty());
}

#[test]
fn test_stream_mode_chunk_per_write() {
    let recipient = Recipient::generate("curve25519");
    let ctx = EncryptionContext::default();
    let mut writer =
        StreamWriter::new(Vec::new(), &ctx, "curve25519", "aes-128/ctr", &recipient.public)
            .unwrap();
    writer.write_all(b"first write").unwrap();
    writer.write_all(b"second").unwrap();
    assert_eq!(writer.chunks_written(), 2);
    let container = writer.finish().unwrap();

    let (_, records) = parse_container(&container);
    let lens: Vec<_> = records.iter().map(|r| (r.last, r.data.len())).collect();
    assert_eq!(lens, vec![(false, 11), (false, 6), (true, 0)]);
    assert_eq!(decrypt(&recipient, &container).unwrap(), b"first writesecond");
}

#[test]
fn test_block_partial_blocks_stay_buffered() {
    let recipient = Recipient::generate("curve25519");
    let ctx = EncryptionContext::default();
    let mut writer =
        StreamWriter::new(Vec::new(), &ctx, "curve25519", "aes-192/cbc", &recipient.public)
            .unwrap();
    writer.write_all(&[7u8; 10]).unwrap();
    assert_eq!(writer.chunks_written(), 0);
    writer.write_all(&[7u8; 10]).unwrap();
    assert_eq!(writer.chunks_written(), 1);
    let container = writer.finish().unwrap();

    let (_, records) = parse_container(&container);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].data.len(), 16);
    assert_eq!(decrypt(&recipient, &container).unwrap(), vec![7u8; 20]);
}

#[test]
fn test_max_chunk_len_splits_writes() {
    let recipient = Recipient::generate("curve25519");
    let config = CodecConfig::default().with_max_chunk_len(40);
    let plaintext = sample_plaintext(100);

    let container = encrypt_with(&recipient, "aes-128/cbc", &plaintext, 100, &config);
    let (_, records) = parse_container(&container);
    let lens: Vec<_> = records.iter().map(|r| r.data.len()).collect();
    assert_eq!(lens, vec![32, 32, 32, 16]);

    let container = encrypt_with(&recipient, "chacha20-poly1305", &plaintext, 100, &config);
    let (_, records) = parse_container(&container);
    let lens: Vec<_> = records.iter().map(|r| (r.last, r.data.len())).collect();
    assert_eq!(lens, vec![(false, 56), (false, 56), (false, 36), (true, 16)]);
    assert_eq!(decrypt(&recipient, &container).unwrap(), plaintext);
}

#[test]
fn test_aead_nonces_differ_per_chunk() {
    let recipient = Recipient::generate("curve25519");
    let container = encrypt_with(
        &recipient,
        "aes-128/gcm",
        &sample_plaintext(200),
        10,
        &CodecConfig::default(),
    );
    let (_, records) = parse_container(&container);
    assert_eq!(records.len(), 21);
    for (i, a) in records.iter().enumerate() {
        for b in &records[i + 1..] {
            assert_ne!(a.nonce, b.nonce);
        }
    }
}

#[test]
fn test_bytes_after_final_record_are_ignored() {
    let recipient = Recipient::generate("curve25519");
    let mut container = encrypt(&recipient, "aes-256/ofb", TEST_PLAINTEXT);
    container.extend_from_slice(b"\x93\xc2\xc0\xc4\x03junk");
    assert_eq!(decrypt(&recipient, &container).unwrap(), TEST_PLAINTEXT);
}

#[test]
fn test_final_block_padding_on_the_wire() {
    let registry = builtin_registry();
    let driver = registry.cipher("aes-128/cbc").unwrap();
    let mut buffer = driver.key_buffer();
    buffer.key_mut().copy_from_slice(&[0x11; 16]);
    buffer.iv_mut().copy_from_slice(&[0x22; 16]);

    let preamble = Preamble::new(vec![0xaa], "curve25519", "aes-128/cbc");
    let keyed = driver.instantiate(&buffer, Direction::Encrypt).unwrap();
    let mut writer = StreamWriter::from_session(
        Vec::new(),
        &preamble,
        keyed,
        &CodecConfig::default(),
        &mut OsRng,
    )
    .unwrap();
    writer.write_all(b"0123456789abcdefXY").unwrap();
    let container = writer.finish().unwrap();

    let (decoded, records) = parse_container(&container);
    assert_eq!(decoded, preamble);
    assert_eq!(records.len(), 2);

    let KeyedCipher::Block(mut cipher) = driver.instantiate(&buffer, Direction::Decrypt).unwrap()
    else {
        panic!("expected block mode");
    };
    let mut first = records[0].data.clone();
    cipher.crypt_blocks(&mut first).unwrap();
    assert_eq!(first, b"0123456789abcdef");

    let mut last = records[1].data.clone();
    cipher.crypt_blocks(&mut last).unwrap();
    let mut expected = b"XY\x00".to_vec();
    expected.extend_from_slice(&[13u8; 13]);
    assert_eq!(last, expected);
}
