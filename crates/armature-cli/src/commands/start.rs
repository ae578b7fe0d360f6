// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Start command: long-running development server.
//!
//! Derives a development pipeline, compiles once up front, then recompiles
//! per debounced file-change cycle with exactly one compilation in flight.
//! Every completed pass clears the terminal and re-renders the status
//! line; completed passes also notify connected browsers over the
//! live-reload channel. Runs until externally terminated.

use crate::compiler::{BundlerProcess, Compile};
use crate::config;
use crate::format::print_serve_status;
use crate::server::{self, ReloadMessage};
use crate::watcher::FileWatcher;
use anyhow::Context;
use armature::{derive, ResolvedPaths};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::broadcast;

/// Runs the development server against the current directory.
pub async fn run(port_override: Option<u16>) -> anyhow::Result<()> {
    let root = std::env::current_dir()?;
    let paths = ResolvedPaths::resolve(&root);
    let options = config::load_options(&paths.root).development();
    let port = port_override.unwrap_or(options.serve.port);

    let pipeline = derive(&options, &paths);
    let compiler =
        BundlerProcess::locate(&paths).context("cannot start the development server")?;

    let (reload_tx, _) = broadcast::channel::<ReloadMessage>(16);
    let reload_tx = Arc::new(reload_tx);
    let latest = Arc::new(RwLock::new(None::<ReloadMessage>));

    let url = format!("http://localhost:{}", port);

    // One in-flight compilation at a time; the watcher callback queues
    // behind whichever pass is running.
    let compile_lock = Arc::new(Mutex::new(()));

    let cycle: Arc<dyn Fn() + Send + Sync> = {
        let compiler = compiler.clone();
        let pipeline = pipeline.clone();
        let reload_tx = reload_tx.clone();
        let latest = latest.clone();
        let url = url.clone();
        Arc::new(move || {
            let _guard = match compile_lock.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match compiler.compile(&pipeline) {
                Ok(result) => {
                    print_serve_status(&url, &result);
                    let message = if result.has_errors() {
                        ReloadMessage::Errors {
                            errors: result.errors.clone(),
                        }
                    } else {
                        ReloadMessage::Reload
                    };
                    if let Ok(mut slot) = latest.write() {
                        *slot = Some(message.clone());
                    }
                    // No receivers is fine; browsers connect later.
                    let _ = reload_tx.send(message);
                }
                Err(err) => {
                    // Tooling failure mid-watch: report it and keep
                    // serving; the next change gets another chance.
                    eprintln!("{}", err);
                }
            }
        })
    };

    // Initial pass before the server accepts traffic.
    {
        let cycle = cycle.clone();
        tokio::task::spawn_blocking(move || cycle()).await?;
    }

    let _watcher = FileWatcher::new(
        vec![paths.src.clone(), paths.public.clone()],
        paths.root.clone(),
        {
            let cycle = cycle.clone();
            move |_changed| cycle()
        },
    )?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    server::serve(
        addr,
        &paths,
        &options,
        pipeline.live_reload,
        reload_tx,
        latest,
    )
    .await
}
