//! Hand-built EMF and WMF streams for integration tests
#![allow(dead_code)]

/// EMF stream builder. `finish` prepends EMR_HEADER and appends EMR_EOF.
pub struct EmfBuilder {
    bounds: [i32; 4],
    records: Vec<Vec<u8>>,
}

impl EmfBuilder {
    /// Inclusive bounds, so (0, 0, 99, 99) gives a 100 by 100 canvas
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            bounds: [left, top, right, bottom],
            records: Vec::new(),
        }
    }

    pub fn record(mut self, record_type: u32, payload: &[u8]) -> Self {
        let padded = payload.len().div_ceil(4) * 4;
        let mut data = record_type.to_le_bytes().to_vec();
        data.extend_from_slice(&(padded as u32 + 8).to_le_bytes());
        data.extend_from_slice(payload);
        data.resize(padded + 8, 0);
        self.records.push(data);
        self
    }

    pub fn words(self, record_type: u32, words: &[i32]) -> Self {
        let payload: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        self.record(record_type, &payload)
    }

    pub fn finish(self) -> Vec<u8> {
        let mut data = Vec::new();
        for v in [1u32, 88] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        for v in self.bounds {
            data.extend_from_slice(&v.to_le_bytes());
        }
        // rclFrame in .01 mm
        for v in [0i32, 0, 2646, 2646] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let num_records = self.records.len() as u32 + 2;
        for v in [0x464D_4520u32, 0x10000, 0, num_records] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        // nHandles, reserved
        data.extend_from_slice(&[1, 0, 0, 0]);
        // nDescription, offDescription, nPalEntries, device px, device mm
        for v in [0u32, 0, 0, 1920, 1080, 508, 286] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        for record in &self.records {
            data.extend_from_slice(record);
        }
        for v in [14u32, 20, 0, 16, 20] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data
    }
}

/// EMR_EXTTEXTOUTW payload drawing `text` at (x, y) with no options
pub fn ext_text_out_w(x: i32, y: i32, text: &str) -> Vec<u8> {
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut payload = Vec::new();
    // rclBounds, iGraphicsMode
    for v in [0i32, 0, 0, 0, 1] {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    for v in [1.0f32, 1.0] {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    for v in [x, y, units.len() as i32, 76, 0, 0, 0, 0, 0, 0] {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    for unit in units {
        payload.extend_from_slice(&unit.to_le_bytes());
    }
    payload
}

/// WMF stream builder, optionally with an Aldus placeable header
pub struct WmfBuilder {
    placement: Option<([i16; 4], u16)>,
    records: Vec<u8>,
}

impl WmfBuilder {
    pub fn standard() -> Self {
        Self {
            placement: None,
            records: Vec::new(),
        }
    }

    pub fn placeable(left: i16, top: i16, right: i16, bottom: i16, inch: u16) -> Self {
        Self {
            placement: Some(([left, top, right, bottom], inch)),
            records: Vec::new(),
        }
    }

    /// Append a record; parameters are 16-bit words in file order
    pub fn record(mut self, function: u16, params: &[i16]) -> Self {
        let words = 3 + params.len() as u32;
        self.records.extend_from_slice(&words.to_le_bytes());
        self.records.extend_from_slice(&function.to_le_bytes());
        for p in params {
            self.records.extend_from_slice(&p.to_le_bytes());
        }
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut data = Vec::new();
        if let Some((rect, inch)) = self.placement {
            data.extend_from_slice(&0x9AC6_CDD7u32.to_le_bytes());
            data.extend_from_slice(&0u16.to_le_bytes());
            for v in rect {
                data.extend_from_slice(&v.to_le_bytes());
            }
            data.extend_from_slice(&inch.to_le_bytes());
            data.extend_from_slice(&[0u8; 6]);
        }
        for v in [1u16, 9, 0x0300] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let file_words = 9 + self.records.len() as u32 / 2 + 3;
        data.extend_from_slice(&file_words.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&16u32.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());
        data.extend_from_slice(&self.records);
        data.extend_from_slice(&[3, 0, 0, 0, 0, 0]);
        data
    }
}
