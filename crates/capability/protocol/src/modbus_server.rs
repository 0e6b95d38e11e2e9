//! Modbus TCP 测试夹具服务器
//!
//! 固定配置的 Modbus 从站，暴露四个预置数据区，用于开发期手动联调协议客户端。
//! 单元 ID 不做区分，所有连接共享同一份数据区，写入对后续读取立即可见。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let server = ModbusFixtureServer::bind("0.0.0.0:5020", &RegionLayout::default()).await?;
//! server.serve_until(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//! ```

use crate::error::ProtocolError;
use crate::regions::DataRegions;
use crate::types::RegionLayout;
use devkit_telemetry::{
    record_fixture_connection, record_fixture_exception, record_fixture_request,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio_modbus::server::tcp::{accept_tcp_connection, Server};
use tokio_modbus::server::Service;
use tokio_modbus::{ExceptionCode, Request, Response};
use tracing::{debug, info, warn};

/// 单次请求的数量上限（Modbus 应用协议规范）
const MAX_READ_BITS: u16 = 2000;
const MAX_WRITE_BITS: u16 = 1968;
const MAX_READ_REGISTERS: u16 = 125;
const MAX_WRITE_REGISTERS: u16 = 123;
const MAX_READ_WRITE_WRITE_REGISTERS: u16 = 121;

/// 数量为 0 或超过功能码上限时返回 `IllegalDataValue`，先于地址校验。
fn check_quantity(req: &Request<'_>) -> Result<(), ExceptionCode> {
    let (count, max) = match req {
        Request::ReadCoils(_, cnt) | Request::ReadDiscreteInputs(_, cnt) => {
            (usize::from(*cnt), MAX_READ_BITS)
        }
        Request::ReadHoldingRegisters(_, cnt) | Request::ReadInputRegisters(_, cnt) => {
            (usize::from(*cnt), MAX_READ_REGISTERS)
        }
        Request::WriteMultipleCoils(_, coils) => (coils.len(), MAX_WRITE_BITS),
        Request::WriteMultipleRegisters(_, words) => (words.len(), MAX_WRITE_REGISTERS),
        Request::ReadWriteMultipleRegisters(_, read_cnt, _, words) => {
            within_limit(usize::from(*read_cnt), MAX_READ_REGISTERS)?;
            (words.len(), MAX_READ_WRITE_WRITE_REGISTERS)
        }
        _ => return Ok(()),
    };
    within_limit(count, max)
}

fn within_limit(count: usize, max: u16) -> Result<(), ExceptionCode> {
    if count == 0 || count > usize::from(max) {
        debug!(count, max, "rejecting modbus request quantity");
        return Err(ExceptionCode::IllegalDataValue);
    }
    Ok(())
}

/// 夹具请求处理服务（每个连接一份，共享数据区）
#[derive(Clone)]
pub struct FixtureService {
    regions: Arc<Mutex<DataRegions>>,
}

impl FixtureService {
    pub fn new(regions: Arc<Mutex<DataRegions>>) -> Self {
        Self { regions }
    }

    fn handle(&self, req: Request<'static>) -> Result<Response, ExceptionCode> {
        check_quantity(&req)?;

        let mut regions = self
            .regions
            .lock()
            .map_err(|_| ExceptionCode::ServerDeviceFailure)?;

        let result = match req {
            Request::ReadCoils(addr, cnt) => regions.read_coils(addr, cnt).map(Response::ReadCoils),
            Request::ReadDiscreteInputs(addr, cnt) => regions
                .read_discrete_inputs(addr, cnt)
                .map(Response::ReadDiscreteInputs),
            Request::ReadHoldingRegisters(addr, cnt) => regions
                .read_holding_registers(addr, cnt)
                .map(Response::ReadHoldingRegisters),
            Request::ReadInputRegisters(addr, cnt) => regions
                .read_input_registers(addr, cnt)
                .map(Response::ReadInputRegisters),
            Request::WriteSingleCoil(addr, coil) => regions
                .write_coils(addr, &[coil])
                .map(|()| Response::WriteSingleCoil(addr, coil)),
            Request::WriteSingleRegister(addr, word) => regions
                .write_holding_registers(addr, &[word])
                .map(|()| Response::WriteSingleRegister(addr, word)),
            Request::WriteMultipleCoils(addr, coils) => regions
                .write_coils(addr, &coils)
                .map(|()| Response::WriteMultipleCoils(addr, coils.len() as u16)),
            Request::WriteMultipleRegisters(addr, words) => regions
                .write_holding_registers(addr, &words)
                .map(|()| Response::WriteMultipleRegisters(addr, words.len() as u16)),
            // 0x17：读写两段地址都校验通过后才写入，写入后再读回
            Request::ReadWriteMultipleRegisters(read_addr, read_cnt, write_addr, words) => regions
                .read_holding_registers(read_addr, read_cnt)
                .and_then(|_| regions.write_holding_registers(write_addr, &words))
                .and_then(|()| regions.read_holding_registers(read_addr, read_cnt))
                .map(Response::ReadWriteMultipleRegisters),
            other => {
                debug!(request = ?other, "unsupported modbus function");
                return Err(ExceptionCode::IllegalFunction);
            }
        };

        result.map_err(|e| {
            debug!(error = %e, "rejecting modbus request");
            ExceptionCode::IllegalDataAddress
        })
    }
}

impl Service for FixtureService {
    type Request = Request<'static>;
    type Response = Response;
    type Exception = ExceptionCode;
    type Future = std::future::Ready<Result<Self::Response, Self::Exception>>;

    fn call(&self, req: Self::Request) -> Self::Future {
        record_fixture_request();
        let result = self.handle(req);
        if result.is_err() {
            record_fixture_exception();
        }
        std::future::ready(result)
    }
}

/// Modbus TCP 夹具服务器
pub struct ModbusFixtureServer {
    listener: TcpListener,
    regions: Arc<Mutex<DataRegions>>,
}

impl ModbusFixtureServer {
    /// 绑定监听地址并预置数据区
    pub async fn bind(addr: &str, layout: &RegionLayout) -> Result<Self, ProtocolError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            regions: Arc::new(Mutex::new(DataRegions::seeded(layout))),
        })
    }

    /// 实际监听地址（绑定 0 端口时用于获取分配的端口）
    pub fn local_addr(&self) -> Result<SocketAddr, ProtocolError> {
        Ok(self.listener.local_addr()?)
    }

    /// 运行服务器，直到 `shutdown` 完成
    pub async fn serve_until<F>(self, shutdown: F) -> Result<(), ProtocolError>
    where
        F: Future<Output = ()>,
    {
        let local_addr = self.listener.local_addr()?;
        info!("modbus fixture listening on {}", local_addr);

        let regions = self.regions;
        let server = Server::new(self.listener);

        let on_connected = |stream: TcpStream, socket_addr: SocketAddr| {
            let regions = Arc::clone(&regions);
            async move {
                record_fixture_connection();
                info!("new modbus connection from {}", socket_addr);
                accept_tcp_connection(stream, socket_addr, move |_| {
                    Ok(Some(FixtureService::new(Arc::clone(&regions))))
                })
            }
        };
        let on_process_error = |err: std::io::Error| {
            warn!(error = %err, "modbus connection error");
        };

        tokio::select! {
            result = server.serve(&on_connected, on_process_error) => {
                result?;
            }
            () = shutdown => {
                info!("modbus fixture on {} shutting down", local_addr);
            }
        }

        Ok(())
    }
}
