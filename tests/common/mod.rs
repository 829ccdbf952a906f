//! Common test utilities and helpers for the cut-out library tests
//!
//! This module provides shared utilities for testing the session engine without a real
//! model server or editor bridge.
#![allow(dead_code)]

/// Mock inference backend that records every call
pub mod mock_backend {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use anyhow::{Result, bail};
    use async_trait::async_trait;
    use cutout_raster::mask::MaskCandidateSet;
    use image::RgbaImage;
    use point_prompt_cutout::core::{ImageEmbedding, Point};
    use point_prompt_cutout::inference::InferenceBackend;
    use tokio::sync::Notify;

    /// Scores used when no scripted scores are queued.
    pub const DEFAULT_SCORES: [f32; 3] = [0.9, 0.5, 0.3];

    #[derive(Default)]
    struct Recorded {
        embed_models: Vec<String>,
        decode_points: Vec<Vec<Point>>,
        in_flight: usize,
        max_in_flight: usize,
        scores: VecDeque<Vec<f32>>,
        fail_embed: bool,
        fail_decodes: usize,
    }

    /// Candidate `c` of `n` covers the columns left of `(c + 1) * width / (n + 1)`.
    pub fn candidate_covers(x: u32, width: u32, candidate: usize, num_candidates: usize) -> bool {
        (x as usize) * (num_candidates + 1) < (candidate + 1) * width as usize
    }

    /// In-process backend. Clones share their recordings.
    #[derive(Clone, Default)]
    pub struct MockBackend {
        inner: Arc<Mutex<Recorded>>,
        embedded: Arc<Notify>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue scores for the next decode; each entry sets the candidate count too.
        pub fn push_scores(&self, scores: &[f32]) {
            self.inner.lock().unwrap().scores.push_back(scores.to_vec());
        }

        pub fn fail_embeddings(&self, fail: bool) {
            self.inner.lock().unwrap().fail_embed = fail;
        }

        pub fn fail_next_decodes(&self, count: usize) {
            self.inner.lock().unwrap().fail_decodes = count;
        }

        pub fn embed_models(&self) -> Vec<String> {
            self.inner.lock().unwrap().embed_models.clone()
        }

        pub fn decode_calls(&self) -> Vec<Vec<Point>> {
            self.inner.lock().unwrap().decode_points.clone()
        }

        pub fn max_in_flight(&self) -> usize {
            self.inner.lock().unwrap().max_in_flight
        }

        /// Resolves after the next embedding call returns.
        pub async fn embedding_returned(&self) {
            self.embedded.notified().await;
        }
    }

    #[async_trait]
    impl InferenceBackend for MockBackend {
        async fn embed(&self, model: &str, image: &RgbaImage) -> Result<ImageEmbedding> {
            let fail = {
                let mut inner = self.inner.lock().unwrap();
                inner.embed_models.push(model.to_string());
                inner.fail_embed
            };
            tokio::task::yield_now().await;
            self.embedded.notify_one();
            if fail {
                bail!("model server unavailable");
            }
            Ok(ImageEmbedding {
                features: vec![0.25; 8],
                shape: vec![1, 2, 4],
                model: model.to_string(),
                original_size: image.dimensions(),
                reshaped_size: image.dimensions(),
            })
        }

        async fn decode(
            &self,
            embedding: &ImageEmbedding,
            points: &[Point],
        ) -> Result<MaskCandidateSet> {
            let (scores, fail) = {
                let mut inner = self.inner.lock().unwrap();
                inner.decode_points.push(points.to_vec());
                inner.in_flight += 1;
                inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
                let fail = inner.fail_decodes > 0;
                if fail {
                    inner.fail_decodes -= 1;
                }
                let scores = inner
                    .scores
                    .pop_front()
                    .unwrap_or_else(|| DEFAULT_SCORES.to_vec());
                (scores, fail)
            };

            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            self.inner.lock().unwrap().in_flight -= 1;
            if fail {
                bail!("decoder crashed");
            }

            let (width, height) = embedding.original_size;
            let n = scores.len();
            let mut labels = Vec::with_capacity((width * height) as usize * n);
            for _y in 0..height {
                for x in 0..width {
                    for c in 0..n {
                        labels.push(candidate_covers(x, width, c, n) as u8);
                    }
                }
            }
            Ok(MaskCandidateSet::new(width, height, n, labels, scores)?)
        }
    }
}

/// Test image builders
pub mod test_frames {
    use image::{Rgba, RgbaImage};

    /// Every pixel distinct: `(x * 10, y * 10, 30, 255)`.
    pub fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, 30, 255])
        })
    }

    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(rgba))
    }
}

/// Pixel assertions
pub mod assertions {
    use image::RgbaImage;
    use point_prompt_cutout::core::Point;

    pub fn assert_pixel(image: &RgbaImage, x: u32, y: u32, expected: [u8; 4]) {
        assert_eq!(
            image.get_pixel(x, y).0,
            expected,
            "pixel ({}, {}) differs",
            x,
            y
        );
    }

    pub fn assert_points_close(actual: &[Point], expected: &[Point]) {
        assert_eq!(actual.len(), expected.len(), "point count differs");
        for (a, e) in actual.iter().zip(expected) {
            assert!(
                (a.x - e.x).abs() < 1e-5 && (a.y - e.y).abs() < 1e-5 && a.label == e.label,
                "expected {:?}, got {:?}",
                e,
                a
            );
        }
    }
}

/// One-shot HTTP responder for frame, mask, and inference endpoints
pub mod http_stub {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    pub struct CannedResponse {
        pub status: u16,
        pub content_type: &'static str,
        pub body: Vec<u8>,
    }

    impl CannedResponse {
        pub fn new(status: u16, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
            Self {
                status,
                content_type,
                body: body.into(),
            }
        }

        pub fn json(value: serde_json::Value) -> Self {
            Self::new(200, "application/json", value.to_string())
        }
    }

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub method: String,
        pub path: String,
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
    }

    impl RecordedRequest {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    fn reason(status: u16) -> &'static str {
        match status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Status",
        }
    }

    fn find_header_end(buf: &[u8]) -> Option<usize> {
        buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
    }

    /// Serve `responses` in order, one connection each. Returns the base URL
    /// (`http://127.0.0.1:PORT`) and a handle resolving to the recorded requests.
    pub async fn serve(responses: Vec<CannedResponse>) -> (String, JoinHandle<Vec<RecordedRequest>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut recorded = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();

                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let (header_end, content_length) = loop {
                    let n = stream.read(&mut chunk).await.unwrap();
                    assert!(n > 0, "connection closed before headers were complete");
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(end) = find_header_end(&buf) {
                        let head = String::from_utf8_lossy(&buf[..end]).to_string();
                        let length = head
                            .lines()
                            .filter_map(|l| l.split_once(':'))
                            .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                            .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        break (end, length);
                    }
                };
                while buf.len() < header_end + content_length {
                    let n = stream.read(&mut chunk).await.unwrap();
                    assert!(n > 0, "connection closed before body was complete");
                    buf.extend_from_slice(&chunk[..n]);
                }

                let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let mut lines = head.lines();
                let request_line = lines.next().unwrap_or_default().to_string();
                let mut parts = request_line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let path = parts.next().unwrap_or_default().to_string();
                let headers = lines
                    .filter_map(|l| l.split_once(':'))
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                    .collect();
                recorded.push(RecordedRequest {
                    method,
                    path,
                    headers,
                    body: buf[header_end..header_end + content_length].to_vec(),
                });

                let head = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    response.status,
                    reason(response.status),
                    response.content_type,
                    response.body.len()
                );
                stream.write_all(head.as_bytes()).await.unwrap();
                stream.write_all(&response.body).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            recorded
        });
        (base, handle)
    }

    /// A URL nothing listens on.
    pub async fn unreachable_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/mask", addr)
    }
}
