use super::{
    ChemToolkit, Depiction, ImageFormat, InchiIdentifiers, IsotopeEnvelope, PlotSpec,
    StructureIdentifiers, ToolkitError,
};
use crate::config::ToolkitConfig;
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::process::Stdio;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

const WORKER_SCRIPT: &str = include_str!("worker.py");

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum WorkerRequest<'a> {
    Ping,
    SmilesToInchi {
        smiles: &'a str,
    },
    InchiToStructure {
        inchi: &'a str,
    },
    IsotopeDistribution {
        smiles: &'a str,
        prob_to_cover: f64,
    },
    StemPlot {
        masses: &'a [f64],
        probs: &'a [f64],
        width: f64,
        height: f64,
        dpi: f64,
        digits: u32,
    },
    Depict {
        smiles: &'a str,
        width: u32,
        height: u32,
        format: ImageFormat,
    },
}

#[derive(Debug, Deserialize)]
struct WorkerResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<WorkerFailure>,
}

#[derive(Debug, Deserialize)]
struct WorkerFailure {
    kind: String,
    message: String,
}

impl WorkerResponse {
    fn into_result(self) -> Result<Value, ToolkitError> {
        if let Some(failure) = self.error {
            return Err(match failure.kind.as_str() {
                "parse" => ToolkitError::Parse(failure.message),
                "encode" => ToolkitError::Encode(failure.message),
                "render" => ToolkitError::Render(failure.message),
                "solve" => ToolkitError::Solve(failure.message),
                _ => ToolkitError::Protocol(failure.message),
            });
        }
        self.result
            .ok_or_else(|| ToolkitError::Protocol("worker response missing result field".into()))
    }
}

#[derive(Debug, Deserialize)]
struct PingPayload {
    rdkit: String,
}

#[derive(Debug, Deserialize)]
struct ImagePayload {
    #[serde(default)]
    svg: Option<String>,
    #[serde(default)]
    png: Option<String>,
}

/// One long-lived Python interpreter running the worker script.
struct WorkerProcess {
    // held so `kill_on_drop` ends the interpreter with the handle
    _child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
}

impl WorkerProcess {
    fn spawn(config: &ToolkitConfig, script: &str, index: usize) -> Result<Self, ToolkitError> {
        let mut cmd = Command::new(&config.python);
        cmd.arg("-u").arg("-c").arg(script);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|e| {
            ToolkitError::Unavailable(format!(
                "failed to spawn toolkit worker {}: {}",
                config.python, e
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolkitError::Unavailable("worker stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ToolkitError::Unavailable("worker stdout not captured".into()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "toolkit", worker = index, "{}", line);
                }
            });
        }

        debug!("Spawned toolkit worker {}", index);

        Ok(Self {
            _child: child,
            stdin,
            stdout: BufReader::new(stdout),
            next_id: 1,
        })
    }

    async fn exchange(&mut self, request: &WorkerRequest<'_>) -> Result<Value, ToolkitError> {
        let id = self.next_id;
        self.next_id += 1;

        let mut message = serde_json::to_value(request)
            .map_err(|e| ToolkitError::Protocol(format!("failed to encode request: {}", e)))?;
        if let Value::Object(map) = &mut message {
            map.insert("id".to_string(), Value::from(id));
        }

        let request_line = format!("{}\n", message);
        self.stdin
            .write_all(request_line.as_bytes())
            .await
            .map_err(|e| ToolkitError::Unavailable(format!("failed to write to worker: {}", e)))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| ToolkitError::Unavailable(format!("failed to flush worker stdin: {}", e)))?;

        loop {
            let mut response_line = String::new();
            let read = self
                .stdout
                .read_line(&mut response_line)
                .await
                .map_err(|e| ToolkitError::Unavailable(format!("failed to read from worker: {}", e)))?;
            if read == 0 {
                return Err(ToolkitError::Unavailable("worker closed its output".into()));
            }

            let response: WorkerResponse = serde_json::from_str(&response_line)
                .map_err(|e| ToolkitError::Protocol(format!("malformed worker response: {}", e)))?;

            // answers to requests abandoned by a cancelled caller arrive first
            match response.id {
                Some(got) if got == id => return response.into_result(),
                Some(got) if got < id => {
                    warn!("Skipping stale worker response {} (waiting for {})", got, id)
                }
                Some(got) => {
                    return Err(ToolkitError::Protocol(format!(
                        "worker answered request {} while {} was pending",
                        got, id
                    )));
                }
                None => {
                    let reason = response
                        .error
                        .map(|failure| failure.message)
                        .unwrap_or_else(|| "no request id in response".to_string());
                    return Err(ToolkitError::Protocol(format!(
                        "worker could not read request {}: {}",
                        id, reason
                    )));
                }
            }
        }
    }
}

/// [`ChemToolkit`] backed by a pool of Python worker processes.
///
/// Each worker handles one request at a time; requests are spread over the
/// pool round-robin. A worker is started on first use and replaced after an
/// I/O failure, protocol violation or timeout.
pub struct PythonToolkit {
    config: ToolkitConfig,
    script: String,
    slots: Vec<Mutex<Option<WorkerProcess>>>,
    next: AtomicUsize,
    timeout: Duration,
}

impl PythonToolkit {
    pub fn new(config: ToolkitConfig) -> Self {
        Self::with_script(config, WORKER_SCRIPT)
    }

    /// Pool whose interpreters run `script` instead of the bundled worker.
    /// The interpreter is invoked as `<python> -u -c <script>`.
    pub fn with_script(config: ToolkitConfig, script: impl Into<String>) -> Self {
        let slots = (0..config.workers.max(1)).map(|_| Mutex::new(None)).collect();
        let timeout = Duration::from_secs(config.request_timeout_secs);
        Self {
            config,
            script: script.into(),
            slots,
            next: AtomicUsize::new(0),
            timeout,
        }
    }

    /// Starts a worker and returns the RDKit version it reports.
    pub async fn ping(&self) -> Result<String, ToolkitError> {
        let payload: PingPayload = decode(self.call(WorkerRequest::Ping).await?)?;
        info!("Toolkit worker ready (RDKit {})", payload.rdkit);
        Ok(payload.rdkit)
    }

    async fn call(&self, request: WorkerRequest<'_>) -> Result<Value, ToolkitError> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.slots.len();
        let mut slot = self.slots[index].lock().await;

        if slot.is_none() {
            *slot = Some(WorkerProcess::spawn(&self.config, &self.script, index)?);
        }
        let Some(worker) = slot.as_mut() else {
            return Err(ToolkitError::Unavailable("worker slot empty".into()));
        };

        let outcome = match tokio::time::timeout(self.timeout, worker.exchange(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ToolkitError::Timeout(self.timeout)),
        };

        if let Err(e) = &outcome {
            if !e.is_conversion_failure() {
                warn!("Discarding toolkit worker {}: {}", index, e);
                *slot = None;
            }
        }

        outcome
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ToolkitError> {
    serde_json::from_value(value)
        .map_err(|e| ToolkitError::Protocol(format!("unexpected worker payload: {}", e)))
}

fn decode_png(encoded: &str) -> Result<Vec<u8>, ToolkitError> {
    STANDARD
        .decode(encoded)
        .map_err(|e| ToolkitError::Protocol(format!("invalid base64 image payload: {}", e)))
}

#[async_trait]
impl ChemToolkit for PythonToolkit {
    async fn smiles_to_inchi(&self, smiles: &str) -> Result<InchiIdentifiers, ToolkitError> {
        decode(self.call(WorkerRequest::SmilesToInchi { smiles }).await?)
    }

    async fn inchi_to_structure(
        &self,
        inchi: &str,
    ) -> Result<StructureIdentifiers, ToolkitError> {
        decode(self.call(WorkerRequest::InchiToStructure { inchi }).await?)
    }

    async fn isotope_distribution(
        &self,
        smiles: &str,
        prob_to_cover: f64,
    ) -> Result<IsotopeEnvelope, ToolkitError> {
        decode(
            self.call(WorkerRequest::IsotopeDistribution {
                smiles,
                prob_to_cover,
            })
            .await?,
        )
    }

    async fn stem_plot(
        &self,
        masses: &[f64],
        probs: &[f64],
        spec: &PlotSpec,
    ) -> Result<Vec<u8>, ToolkitError> {
        let payload: ImagePayload = decode(
            self.call(WorkerRequest::StemPlot {
                masses,
                probs,
                width: spec.width,
                height: spec.height,
                dpi: spec.dpi,
                digits: spec.digits,
            })
            .await?,
        )?;
        let png = payload
            .png
            .ok_or_else(|| ToolkitError::Protocol("stem plot payload without png".into()))?;
        decode_png(&png)
    }

    async fn depict(
        &self,
        smiles: &str,
        width: u32,
        height: u32,
        format: ImageFormat,
    ) -> Result<Depiction, ToolkitError> {
        let payload: ImagePayload = decode(
            self.call(WorkerRequest::Depict {
                smiles,
                width,
                height,
                format,
            })
            .await?,
        )?;
        match (format, payload) {
            (ImageFormat::Svg, ImagePayload { svg: Some(svg), .. }) => Ok(Depiction::Svg(svg)),
            (ImageFormat::Png, ImagePayload { png: Some(png), .. }) => {
                Ok(Depiction::Png(decode_png(&png)?))
            }
            (format, _) => Err(ToolkitError::Protocol(format!(
                "depiction payload does not contain {}",
                format
            ))),
        }
    }
}
