mod common;

use common::*;
use cryptoinfra::config::MAX_CHUNK_OVERHEAD;
use std::io::{Read, Seek, SeekFrom, Write};

const LENGTHS: &[usize] = &[0, 1, 15, 16, 17, 130, 1000];

#[test]
fn test_roundtrip_all_algorithm_pairs() {
    init_tracing();
    for &pk_algo in PK_ALGORITHMS {
        let recipient = Recipient::generate(pk_algo);
        for cipher in all_ciphers() {
            for &len in LENGTHS {
                let plaintext = sample_plaintext(len);
                let container = encrypt(&recipient, cipher, &plaintext);
                let decrypted = decrypt(&recipient, &container).unwrap();
                assert_eq!(decrypted, plaintext, "{pk_algo} {cipher} len {len}");
            }
        }
    }
}

#[test]
fn test_roundtrip_many_small_writes() {
    init_tracing();
    let recipient = Recipient::generate("curve25519");
    let plaintext = sample_plaintext(517);
    for cipher in ["aes-128/cbc", "aes-256/cfb", "aes-256/ctr", "aes-192/ofb", "chacha20-poly1305"] {
        for write_len in [1, 3, 7, 16, 33] {
            let container = encrypt_with(
                &recipient,
                cipher,
                &plaintext,
                write_len,
                &CodecConfig::default(),
            );
            let decrypted = decrypt(&recipient, &container).unwrap();
            assert_eq!(decrypted, plaintext, "{cipher} write_len {write_len}");
        }
    }
}

#[test]
fn test_roundtrip_with_small_chunks() {
    let recipient = Recipient::generate("fips_p256");
    let plaintext = sample_plaintext(3000);
    let config = CodecConfig::default().with_max_chunk_len(100);
    for cipher in ["aes-256/cbc", "aes-128/ctr", "aes-128/gcm"] {
        let container = encrypt_with(&recipient, cipher, &plaintext, 1024, &config);
        let (_, records) = parse_container(&container);
        assert!(records.len() > 30, "{cipher} produced {} records", records.len());
        assert_eq!(decrypt(&recipient, &container).unwrap(), plaintext);
    }
}

#[test]
fn test_roundtrip_with_associated_data() {
    let recipient = Recipient::generate("curve25519");
    let config = CodecConfig::default().with_associated_data_len(6);
    for cipher in AEAD_CIPHERS {
        let container = encrypt_with(&recipient, cipher, TEST_PLAINTEXT, 10, &config);
        let (_, records) = parse_container(&container);
        let nonce_size = if *cipher == "xchacha20-poly1305" { 24 } else { 12 };
        assert!(records.iter().all(|r| r.nonce.len() == nonce_size + 6));
        assert_eq!(decrypt(&recipient, &container).unwrap(), TEST_PLAINTEXT);
    }
}

#[test]
fn test_nist_curve_preambles() {
    for (pk_algo, opaque_len) in [("fips_p256", 65), ("fips_p384", 97), ("fips_p521", 133)] {
        let recipient = Recipient::generate(pk_algo);
        let container = encrypt(&recipient, "aes-128/cfb", TEST_PLAINTEXT);
        let (preamble, _) = parse_container(&container);
        assert_eq!(preamble.pk_algo, pk_algo);
        assert_eq!(preamble.opaque.len(), opaque_len);
        assert_eq!(preamble.opaque[0], 0x04);
        assert_eq!(decrypt(&recipient, &container).unwrap(), TEST_PLAINTEXT);
    }
}

#[test]
fn test_small_read_buffers() {
    let recipient = Recipient::generate("curve25519");
    let plaintext = sample_plaintext(700);
    let container = encrypt_with(&recipient, "aes-128/cbc", &plaintext, 50, &CodecConfig::default());

    let mut reader = StreamReader::new(container.as_slice(), &recipient.decrypter()).unwrap();
    let mut decrypted = Vec::new();
    let mut buf = [0u8; 7];
    loop {
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        decrypted.extend_from_slice(&buf[..n]);
    }
    assert_eq!(decrypted, plaintext);
    assert!(reader.is_finished());
    assert_eq!(reader.read(&mut buf).unwrap(), 0);
}

#[test]
fn test_algorithm_key_ring_selects_by_preamble() {
    let x25519 = Recipient::generate("curve25519");
    let p256 = Recipient::generate("fips_p256");
    let ring = AlgorithmKeyRing::new()
        .with_key(x25519.private.clone())
        .with_key(p256.private.clone());
    let ctx = DecryptionContext::with_builtins(ring);

    for recipient in [&x25519, &p256] {
        let container = encrypt(recipient, "aes-256/gcm", TEST_PLAINTEXT);
        let mut reader = StreamReader::new(container.as_slice(), &ctx).unwrap();
        assert_eq!(reader.preamble().pk_algo, recipient.pk_algo);
        let mut decrypted = Vec::new();
        reader.read_to_end(&mut decrypted).unwrap();
        assert_eq!(decrypted, TEST_PLAINTEXT);
    }
}

#[test]
fn test_file_backed_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let recipient = Recipient::generate("fips_p256");
    let plaintext = sample_plaintext(64 * 1024 + 3);

    let file = tempfile::tempfile()?;
    let ctx = EncryptionContext::default();
    let mut writer = StreamWriter::new(file, &ctx, "fips_p256", "xchacha20-poly1305", &recipient.public)?;
    for piece in plaintext.chunks(4096) {
        writer.write_all(piece)?;
    }
    let mut file = writer.finish()?;

    file.seek(SeekFrom::Start(0))?;
    let mut reader = StreamReader::new(file, &recipient.decrypter())?;
    let mut decrypted = Vec::new();
    reader.read_to_end(&mut decrypted)?;
    assert_eq!(decrypted, plaintext);
    assert_eq!(reader.chunks_read(), 18);
    Ok(())
}

#[test]
fn test_codec_config_from_json() {
    let config: CodecConfig = serde_json::from_str(
        r#"{ "max_chunk_len": 256, "associated_data_len": 2, "max_field_len": 4096 }"#,
    )
    .unwrap();
    assert_eq!(config.write_buffer_capacity, CodecConfig::default().write_buffer_capacity);

    let recipient = Recipient::generate("curve25519");
    let plaintext = sample_plaintext(2000);
    let container = encrypt_with(&recipient, "aes-128/gcm", &plaintext, 2000, &config);
    let (_, records) = parse_container(&container);
    assert_eq!(records.len(), 9);

    let mut reader =
        StreamReader::with_config(container.as_slice(), &recipient.decrypter(), &config).unwrap();
    let mut decrypted = Vec::new();
    reader.read_to_end(&mut decrypted).unwrap();
    assert_eq!(decrypted, plaintext);
}

#[test]
fn test_reader_accepts_full_chunks_under_shared_config() {
    let recipient = Recipient::generate("curve25519");
    let ctx = EncryptionContext::default();

    // Tag or padding would push a full chunk past the field limit
    let tight = CodecConfig::default()
        .with_max_field_len(512)
        .with_max_chunk_len(512);
    let err = StreamWriter::with_config(
        Vec::new(),
        &ctx,
        "curve25519",
        "aes-128/gcm",
        &recipient.public,
        &tight,
    )
    .err()
    .unwrap();
    assert!(matches!(err, StreamError::InvalidConfig(_)));

    let config = tight.with_max_chunk_len(512 - MAX_CHUNK_OVERHEAD);
    let plaintext = sample_plaintext(512);
    for cipher in ["aes-128/gcm", "xchacha20-poly1305", "aes-256/cbc", "aes-128/cfb"] {
        let container = encrypt_with(&recipient, cipher, &plaintext, 512, &config);
        let mut reader =
            StreamReader::with_config(container.as_slice(), &recipient.decrypter(), &config)
                .unwrap();
        let mut decrypted = Vec::new();
        reader.read_to_end(&mut decrypted).unwrap();
        assert_eq!(decrypted, plaintext, "{cipher}");
    }
}
