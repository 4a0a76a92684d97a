//! Benchmark: hand-written Decode vs layout-driven decode of the same synthetic records.
//! Records are a u16 id, a 4-byte label, a keyed 14-byte header and an 8-byte payload.

use binshape::{decode_layout, BinaryDecoder, Decode, DecodeError, Decoder, DecoderOptions, Endianness, Schema};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const LAYOUTS: &str = r#"
keyed Header {
  kind: u8 @0;
  name: cstring @1;
  scale: f64 @6;
}
sequence Record {
  id: u16;
  label: string(4);
  header: Header(14);
  payload: [u16; 4];
}
sequence Batch { records: [Record]; }
"#;

const RECORD_LEN: usize = 2 + 4 + 14 + 8;

struct Record {
    id: u16,
    header_kind: u8,
    scale: f64,
    payload: Vec<u16>,
}

impl Decode for Record {
    fn decode(decoder: &mut Decoder<'_>) -> Result<Self, DecodeError> {
        let mut fields = decoder.sequential();
        let id = fields.decode()?;
        fields.skip(4)?;
        let (header_kind, scale) = fields.decode_nested(Some(14), |d| {
            let mut header = d.keyed();
            Ok((header.decode::<u8>(0usize)?, header.decode::<f64>(6usize)?))
        })?;
        let payload = fields.decode_value_with_length(8)?;
        Ok(Record { id, header_kind, scale, payload })
    }
}

fn batch(records: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(records * RECORD_LEN);
    for i in 0..records {
        out.extend_from_slice(&(i as u16).to_be_bytes());
        out.extend_from_slice(b"rec0");
        out.extend_from_slice(&[(i % 256) as u8, b'h', b'd', b'r', 0x00, 0x00]);
        out.extend_from_slice(&(i as f64 * 0.25).to_be_bytes());
        for k in 0..4u16 {
            out.extend_from_slice(&k.to_be_bytes());
        }
    }
    out
}

fn bench_decode(c: &mut Criterion) {
    let schema = Schema::from_source(LAYOUTS).expect("resolve");
    let options = DecoderOptions::new(Endianness::Big);
    let decoder = BinaryDecoder::new().with_endianness(Endianness::Big);
    let bytes = batch(1_000);

    let records: Vec<Record> = decoder.decode(&bytes).expect("decode");
    let checksum: u64 = records
        .iter()
        .map(|r| r.id as u64 + r.header_kind as u64 + r.scale as u64 + r.payload.len() as u64)
        .sum();
    eprintln!("decode: {} records, {} bytes, checksum {}", records.len(), bytes.len(), checksum);

    c.bench_function("decode_typed_1000_records", |b| {
        b.iter(|| {
            let records: Vec<Record> = decoder.decode(black_box(&bytes)).expect("decode");
            black_box(records.len())
        });
    });

    c.bench_function("decode_layout_1000_records", |b| {
        b.iter(|| {
            let value = decode_layout(&schema, "Batch", black_box(&bytes), &options).expect("decode");
            black_box(value)
        });
    });

    c.bench_function("decode_u64_keyed", |b| {
        let region = [0x32, 0xe6, 0x00, 0xff, 0x78, 0x13, 0x42, 0xb7];
        b.iter(|| {
            let mut session = Decoder::new(black_box(&region), &options);
            let mut fields = session.keyed();
            black_box(fields.decode::<u64>(0usize).expect("decode"))
        });
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
