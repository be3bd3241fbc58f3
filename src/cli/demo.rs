//! Demo subcommand - wire a small set of sample services.

use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use crate::config::Config;
use crate::{Constructor, Container, Injectable, Module};

/// Service without dependencies.
#[derive(Debug, Injectable)]
pub struct AService;

impl AService {
    pub fn describe(&self) -> &'static str {
        "A service"
    }
}

/// Optional collaborator of [`BService`].
#[derive(Debug, Injectable)]
pub struct CService;

/// Service with two constructors: `(AService, CService)` is preferred and
/// `(AService)` is the fallback when `CService` is not registered.
#[derive(Debug)]
pub struct BService {
    a_service: Arc<AService>,
    c_service: Option<Arc<CService>>,
}

impl BService {
    pub fn a_service(&self) -> &Arc<AService> {
        &self.a_service
    }

    pub fn has_c_service(&self) -> bool {
        self.c_service.is_some()
    }
}

impl Injectable for BService {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![
            Constructor::new(|a_service: Arc<AService>, c_service: Arc<CService>| BService {
                a_service,
                c_service: Some(c_service),
            }),
            Constructor::new(|a_service: Arc<AService>| BService {
                a_service,
                c_service: None,
            }),
        ]
    }
}

/// Top of the sample graph; shares its `AService` with `BService`.
#[derive(Debug, Injectable)]
pub struct Reporter {
    a_service: Arc<AService>,
    b_service: Arc<BService>,
}

/// Registers the sample services.
pub struct SampleServices {
    /// Also register `CService`, enabling the two-argument `BService` constructor.
    pub with_optional: bool,
}

impl Module for SampleServices {
    fn register(&self, container: &Container) {
        container.register::<AService>();
        container.register::<BService>();
        container.register::<Reporter>();
        if self.with_optional {
            container.register::<CService>();
        }
    }
}

/// What the demo observed after resolving [`Reporter`].
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DemoReport {
    pub registered: Vec<String>,
    pub a_service: String,
    pub b_service_has_c_service: bool,
    pub a_service_shared: bool,
    pub max_depth: usize,
}

/// Wire the sample services and report how they were built.
#[derive(Parser)]
pub struct DemoCommand {
    /// Register CService so BService uses its two-argument constructor.
    #[arg(long)]
    pub with_optional: bool,
}

impl DemoCommand {
    /// Run the demo command.
    pub fn run(&self) -> color_eyre::Result<()> {
        let config = Config::load()?;
        let container = Container::with_config(config.resolution);

        let report = self.wire(&container)?;
        tracing::info!("Resolved sample services: {:?}", container);

        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }

    /// Install the sample services into `container` and resolve them.
    pub fn wire(&self, container: &Container) -> color_eyre::Result<DemoReport> {
        container.install(&SampleServices {
            with_optional: self.with_optional,
        });

        let reporter = container.get::<Reporter>()?;
        let b_service = container.get::<BService>()?;

        Ok(DemoReport {
            registered: container
                .registered()
                .iter()
                .map(|ty| ty.short_name().to_string())
                .collect(),
            a_service: reporter.a_service.describe().to_string(),
            b_service_has_c_service: reporter.b_service.has_c_service(),
            a_service_shared: Arc::ptr_eq(&reporter.a_service, b_service.a_service()),
            max_depth: container.config().max_depth,
        })
    }
}
