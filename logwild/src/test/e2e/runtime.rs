use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, OnceLock},
    time::Duration,
};

use clap::Parser;
use rama::{
    Layer as _, Service,
    error::BoxError,
    http::{Request, Response, client::EasyHttpWebClient},
    layer::TimeoutLayer,
    net::address::SocketAddress,
};

use logwild_lib::utils::test::unique_empty_temp_dir;

use crate::Args;

pub(super) struct Runtime {
    data_dir: PathBuf,
    http_addr: SocketAddress,
}

impl Runtime {
    #[inline(always)]
    pub fn http_socket_addr(&self) -> SocketAddress {
        self.http_addr
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.http_socket_addr())
    }

    #[inline(always)]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn client(&self) -> impl Service<Request, Output = Response, Error = BoxError> {
        TimeoutLayer::new(Duration::from_secs(30)).into_layer(EasyHttpWebClient::default())
    }
}

/// Spawn a logwild server writing its logs to `out.log` in a fresh data dir.
pub(super) async fn spawn_with_args(extra_args: &[&str]) -> Runtime {
    let data_dir = unique_empty_temp_dir("logwild_app_e2e").unwrap();
    eprintln!("logwild_app_e2e all data stored under: {data_dir:?}");

    let data_dir_str = data_dir.display().to_string().leak();
    let out_file_str = data_dir.join("out.log").display().to_string().leak();

    let mut argv: Vec<&str> = vec![
        crate::utils::env::project_name(),
        "--data",
        data_dir_str,
        "--graceful",
        "0.42",
        "run",
        "--bind",
        "127.0.0.1:0",
        "--out-file",
        out_file_str,
    ];
    argv.extend(extra_args);

    let args = Args::try_parse_from(argv).unwrap();

    let wait_server_ready = Arc::new(OnceLock::new());
    let notify_server_ready = wait_server_ready.clone();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let server_future = crate::run_with_args(std::future::pending::<()>(), args);

        notify_server_ready.set(()).expect("waiter to be nofified");

        rt.block_on(server_future).expect("serve without errors");
    });

    wait_server_ready.wait();

    let http_addr = tokio::time::timeout(
        Duration::from_secs(60),
        read_file_or_wait(data_dir.join("http.addr.txt")),
    )
    .await
    .unwrap();
    assert!(http_addr.ip_addr.is_loopback());

    Runtime {
        data_dir,
        http_addr,
    }
}

async fn read_file_or_wait(path: PathBuf) -> SocketAddress {
    loop {
        match tokio::fs::read_to_string(&path).await {
            Ok(s) => {
                let s = s.trim();
                if s.is_empty() {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
                match s.parse() {
                    Ok(addr) => return addr,
                    Err(err) => {
                        eprintln!("unexpected error parsing socket addr (content={s:?}): {err}");
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        continue;
                    }
                }
            }
            Err(err) => {
                if err.kind() == ErrorKind::NotFound {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                } else {
                    panic!("unexpected error: {err}");
                }
            }
        }
    }
}
