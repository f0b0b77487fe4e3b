//! Simulator bridge to the `teach` Python package.
use crate::{ActionOutcome, EdhInstance, EpisodeProgress, TeachEnvConfig, TeachSimulator};
use anyhow::Result;
use image::RgbImage;
use log::{info, trace, warn};
use pyo3::{
    types::{IntoPyDict, PyBytes, PyDict, PyTuple},
    PyAny, PyObject, PyResult, Python,
};
use std::{collections::HashMap, path::Path};

const CAMERAS: [&str; 3] = ["ego", "allo", "targetobject"];

/// [`TeachSimulator`] backed by `teach.replay.episode_replay.EpisodeReplay`.
///
/// Episodes are initialized by
/// `teach.inference.edh_inference_runner.EdhInferenceRunner`, which replays
/// the history of the instance and computes the task to check.
pub struct PyTeachSimulator {
    /// `EpisodeReplay` instance, replaced at every episode.
    er: PyObject,

    /// `InferenceRunnerConfig` instance.
    runner_config: PyObject,

    replay_timeout: u32,
}

impl PyTeachSimulator {
    fn outcome(ret: &PyAny) -> PyResult<ActionOutcome> {
        let ret: &PyTuple = ret.extract()?;
        let success: bool = ret.get_item(0).extract()?;
        let message: String = if ret.len() > 1 {
            ret.get_item(1).extract().unwrap_or_default()
        } else {
            String::new()
        };
        Ok(ActionOutcome { success, message })
    }

    fn frame(py: Python, array: &PyAny) -> Result<Option<RgbImage>> {
        if array.is_none() {
            return Ok(None);
        }
        let shape: Vec<usize> = array.getattr("shape")?.extract()?;
        if shape.len() != 3 || shape[2] != 3 {
            warn!("Skipping frame of shape {:?}", shape);
            return Ok(None);
        }
        let array = py
            .import("numpy")?
            .getattr("ascontiguousarray")?
            .call1((array, "uint8"))?;
        let bytes: &PyBytes = array.call_method0("tobytes")?.extract()?;
        Ok(RgbImage::from_raw(
            shape[1] as u32,
            shape[0] as u32,
            bytes.as_bytes().to_vec(),
        ))
    }
}

impl TeachSimulator for PyTeachSimulator {
    fn connect(config: &TeachEnvConfig) -> Result<Self> {
        Python::with_gil(|py| {
            let sys = py.import("sys")?;
            let ver: String = sys.getattr("version")?.extract()?;
            info!("Initialize PyTeachSimulator");
            info!("Python version = {}", ver);

            let er = py
                .import("teach.replay.episode_replay")?
                .getattr("EpisodeReplay")?
                .call1(("thor", CAMERAS.to_vec()))?;

            let kwargs = vec![
                ("data_dir", config.data_dir.to_string_lossy().into_owned()),
                ("split", config.split.clone()),
                ("output_dir", config.output_dir.to_string_lossy().into_owned()),
                ("images_dir", config.images_dir.to_string_lossy().into_owned()),
            ]
            .into_py_dict(py);
            kwargs.set_item("model_class", py.None())?;
            kwargs.set_item("model_args", Vec::<String>::new())?;
            let runner_config = py
                .import("teach.inference.inference_runner_base")?
                .getattr("InferenceRunnerConfig")?
                .call((), Some(kwargs))?;

            Ok(Self {
                er: er.into(),
                runner_config: runner_config.into(),
                replay_timeout: config.replay_timeout,
            })
        })
    }

    fn initialize_episode(&mut self, instance: &EdhInstance, game_file: &Path) -> Result<bool> {
        trace!("PyTeachSimulator::initialize_episode()");
        let raw = serde_json::to_string(&instance.raw)?;
        Python::with_gil(|py| {
            let instance = py.import("json")?.getattr("loads")?.call1((raw,))?;
            let runner = py
                .import("teach.inference.edh_inference_runner")?
                .getattr("EdhInferenceRunner")?;
            let check_task = runner
                .getattr("_get_check_task")?
                .call1((instance, self.runner_config.as_ref(py)))?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("replay_timeout", self.replay_timeout)?;
            kwargs.set_item("er", self.er.as_ref(py))?;
            let ret = runner.getattr("_initialize_episode_replay")?.call(
                (
                    instance,
                    game_file.to_string_lossy().into_owned(),
                    check_task,
                ),
                Some(kwargs),
            )?;
            let (success, er): (bool, PyObject) = ret.extract()?;
            self.er = er;
            Ok(success)
        })
    }

    fn latest_images(&mut self) -> Result<HashMap<String, RgbImage>> {
        Python::with_gil(|py| {
            let images = self
                .er
                .as_ref(py)
                .getattr("simulator")?
                .call_method0("get_latest_images")?;
            let images: &PyDict = images.extract()?;
            let mut frames = HashMap::new();
            for (key, array) in images.iter() {
                let key: String = key.extract()?;
                if let Some(frame) = Self::frame(py, array)? {
                    frames.insert(key, frame);
                }
            }
            Ok(frames)
        })
    }

    fn apply_motion(&mut self, action: &str) -> Result<ActionOutcome> {
        trace!("PyTeachSimulator::apply_motion({})", action);
        Python::with_gil(|py| {
            let simulator = self.er.as_ref(py).getattr("simulator")?;
            let ret = simulator.call_method1("apply_motion", (action, 1))?;
            Ok(Self::outcome(ret)?)
        })
    }

    fn apply_object_interaction(&mut self, action: &str, y: f32, x: f32) -> Result<ActionOutcome> {
        trace!(
            "PyTeachSimulator::apply_object_interaction({}, {}, {})",
            action,
            y,
            x
        );
        Python::with_gil(|py| {
            let simulator = self.er.as_ref(py).getattr("simulator")?;
            let ret = simulator.call_method1("apply_object_interaction", (action, 1, y, x))?;
            Ok(Self::outcome(ret)?)
        })
    }

    fn check_episode_progress(&mut self) -> Result<EpisodeProgress> {
        Python::with_gil(|py| {
            let simulator = self.er.as_ref(py).getattr("simulator")?;
            let task = simulator.getattr("current_task")?;
            let ret = simulator.call_method1("check_episode_progress", (task,))?;
            let ret: &PyTuple = ret.extract()?;
            Ok(EpisodeProgress {
                task_desc: ret.get_item(0).extract().unwrap_or_default(),
                success: ret.get_item(1).extract()?,
                goal_conditions_total: ret.get_item(3).extract()?,
                goal_conditions_satisfied: ret.get_item(4).extract()?,
            })
        })
    }

    fn shutdown(&mut self) -> Result<()> {
        Python::with_gil(|py| {
            self.er
                .as_ref(py)
                .getattr("simulator")?
                .call_method0("shutdown_simulator")?;
            Ok(())
        })
    }
}
