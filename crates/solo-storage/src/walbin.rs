use ciborium::ser;
use crc32c::crc32c;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use prometheus::{register_int_counter, IntCounter};
use serde::{Deserialize, Serialize};
use std::{
    fs::{File, OpenOptions},
    io::{Read, Write},
    path::{Path, PathBuf},
};

const MAGIC: [u8; 4] = *b"SLOW";
const VER: u8 = 1;
// magic + version + type + seq + ts + body len
const HEADER_LEN: usize = 4 + 1 + 1 + 8 + 8 + 4;
const SEGMENT: &str = "00000001.wal";

static WAL_RECORDS_TOTAL: Lazy<IntCounter> =
    Lazy::new(|| register_int_counter!("wal_records_total", "WAL records appended").unwrap());

#[repr(u8)]
#[derive(Debug, Clone, Copy)]
pub enum RecType {
    Put = 1,
    Delete = 2,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecBody {
    /// Full document after an add or update.
    Put {
        table: String,
        doc: serde_json::Value,
    },
    Delete {
        table: String,
        id: String,
    },
}

impl RecBody {
    fn rectype(&self) -> RecType {
        match self {
            RecBody::Put { .. } => RecType::Put,
            RecBody::Delete { .. } => RecType::Delete,
        }
    }
}

/// Append-only log of CRC32C-framed CBOR records.
pub struct WalWriter {
    path: PathBuf,
    inner: Mutex<WalInner>,
}

struct WalInner {
    file: File,
    seq: u64,
}

impl WalWriter {
    pub fn open(dir: impl AsRef<Path>, start_seq: u64) -> std::io::Result<Self> {
        let wal_dir = dir.as_ref().join("wal");
        std::fs::create_dir_all(&wal_dir)?;
        let path = wal_dir.join(SEGMENT);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            inner: Mutex::new(WalInner {
                file,
                seq: start_seq,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes and syncs one record; returns its sequence number.
    pub fn append(&self, ts: i64, body: &RecBody) -> std::io::Result<u64> {
        let mut v = Vec::new();
        ser::into_writer(body, &mut v)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        let mut inner = self.inner.lock();
        inner.seq += 1;
        let seq = inner.seq;
        let rec = frame(seq, ts, body.rectype(), &v);
        inner.file.write_all(&rec)?;
        inner.file.flush()?;
        inner.file.sync_data()?;
        WAL_RECORDS_TOTAL.inc();
        Ok(seq)
    }
}

fn frame(seq: u64, ts: i64, typ: RecType, body: &[u8]) -> Vec<u8> {
    let mut rec = Vec::with_capacity(HEADER_LEN + body.len() + 4);
    rec.extend_from_slice(&MAGIC);
    rec.push(VER);
    rec.push(typ as u8);
    rec.extend_from_slice(&seq.to_be_bytes());
    rec.extend_from_slice(&(ts as u64).to_be_bytes());
    rec.extend_from_slice(&(body.len() as u32).to_be_bytes());
    rec.extend_from_slice(body);
    let crc = crc32c(&rec);
    rec.extend_from_slice(&crc.to_be_bytes());
    rec
}

/// Reads every intact record in order. Replay stops at the first truncated
/// or corrupt frame.
pub fn replay(dir: impl AsRef<Path>) -> std::io::Result<Vec<(u64, RecBody)>> {
    let path = dir.as_ref().join("wal").join(SEGMENT);
    let mut out = Vec::new();
    let mut f = match File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e),
    };
    let file_len = f.metadata()?.len();
    let mut pos = 0u64;
    loop {
        let mut hdr = [0u8; HEADER_LEN];
        if f.read_exact(&mut hdr).is_err() {
            break;
        }
        if hdr[0..4] != MAGIC {
            tracing::warn!(path = %path.display(), "bad wal magic, stopping replay");
            break;
        }
        let mut seq_bytes = [0u8; 8];
        seq_bytes.copy_from_slice(&hdr[6..14]);
        let seq = u64::from_be_bytes(seq_bytes);
        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&hdr[22..26]);
        let len = u32::from_be_bytes(len_bytes) as usize;
        let frame_len = (HEADER_LEN + len + 4) as u64;
        if pos + frame_len > file_len {
            tracing::warn!(seq, len, "wal record runs past end of file, stopping replay");
            break;
        }
        pos += frame_len;
        let mut body = vec![0u8; len];
        if f.read_exact(&mut body).is_err() {
            break;
        }
        let mut crcbuf = [0u8; 4];
        if f.read_exact(&mut crcbuf).is_err() {
            break;
        }
        let mut rec = hdr.to_vec();
        rec.extend_from_slice(&body);
        if crc32c(&rec) != u32::from_be_bytes(crcbuf) {
            tracing::warn!(seq, "wal checksum mismatch, stopping replay");
            break;
        }
        match ciborium::de::from_reader::<RecBody, _>(&body[..]) {
            Ok(v) => out.push((seq, v)),
            Err(e) => {
                tracing::warn!(seq, error = %e, "undecodable wal record skipped");
            }
        }
    }
    Ok(out)
}
