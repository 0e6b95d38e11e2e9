use devkit_protocol::{ModbusFixtureServer, RegionLayout};
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_modbus::prelude::*;

async fn start(layout: RegionLayout) -> (SocketAddr, oneshot::Sender<()>, JoinHandle<()>) {
    let server = ModbusFixtureServer::bind("127.0.0.1:0", &layout)
        .await
        .expect("bind");
    let addr = server.local_addr().expect("local addr");
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        server
            .serve_until(async {
                let _ = stop_rx.await;
            })
            .await
            .expect("serve");
    });
    (addr, stop_tx, handle)
}

#[tokio::test]
async fn client_reads_all_four_seeded_regions() {
    let (addr, stop, handle) = start(RegionLayout::default()).await;
    let mut ctx = tcp::connect(addr).await.expect("connect");

    let coils = ctx.read_coils(0, 8).await.expect("io").expect("coils");
    assert_eq!(coils, vec![true; 8]);
    let inputs = ctx
        .read_discrete_inputs(90, 10)
        .await
        .expect("io")
        .expect("discrete inputs");
    assert_eq!(inputs, vec![true; 10]);
    let holding = ctx
        .read_holding_registers(0, 4)
        .await
        .expect("io")
        .expect("holding");
    assert_eq!(holding, vec![17; 4]);
    let input = ctx
        .read_input_registers(99, 1)
        .await
        .expect("io")
        .expect("input");
    assert_eq!(input, vec![17]);

    let _ = stop.send(());
    handle.await.expect("join");
}

#[tokio::test]
async fn writes_are_shared_between_connections() {
    let (addr, stop, handle) = start(RegionLayout::default()).await;

    let mut writer = tcp::connect(addr).await.expect("connect writer");
    writer
        .write_multiple_registers(10, &[1, 2, 3])
        .await
        .expect("io")
        .expect("write registers");
    writer
        .write_single_coil(5, false)
        .await
        .expect("io")
        .expect("write coil");

    let mut reader = tcp::connect(addr).await.expect("connect reader");
    let holding = reader
        .read_holding_registers(9, 5)
        .await
        .expect("io")
        .expect("holding");
    assert_eq!(holding, vec![17, 1, 2, 3, 17]);
    let coils = reader.read_coils(4, 3).await.expect("io").expect("coils");
    assert_eq!(coils, vec![true, false, true]);

    let _ = stop.send(());
    handle.await.expect("join");
}

#[tokio::test]
async fn out_of_range_read_returns_exception() {
    let layout = RegionLayout::uniform(10, false, 0);
    let (addr, stop, handle) = start(layout).await;
    let mut ctx = tcp::connect(addr).await.expect("connect");

    let result = ctx.read_input_registers(8, 4).await.expect("io");
    assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));

    // 异常响应后连接仍可用
    let ok = ctx.read_input_registers(0, 2).await.expect("io");
    assert_eq!(ok, Ok(vec![0, 0]));

    let _ = stop.send(());
    handle.await.expect("join");
}

#[tokio::test]
async fn oversized_quantity_returns_exception_and_keeps_connection() {
    let (addr, stop, handle) = start(RegionLayout::uniform(1000, true, 17)).await;
    let mut ctx = tcp::connect(addr).await.expect("connect");

    let result = ctx.read_holding_registers(0, 200).await.expect("io");
    assert_eq!(result, Err(ExceptionCode::IllegalDataValue));

    let ok = ctx.read_holding_registers(0, 125).await.expect("io");
    assert_eq!(ok, Ok(vec![17; 125]));

    let _ = stop.send(());
    handle.await.expect("join");
}

#[tokio::test]
async fn rejected_read_write_does_not_modify_registers() {
    let (addr, stop, handle) = start(RegionLayout::uniform(10, true, 17)).await;
    let mut ctx = tcp::connect(addr).await.expect("connect");

    let result = ctx
        .read_write_multiple_registers(8, 5, 0, &[99])
        .await
        .expect("io");
    assert_eq!(result, Err(ExceptionCode::IllegalDataAddress));

    let holding = ctx.read_holding_registers(0, 1).await.expect("io");
    assert_eq!(holding, Ok(vec![17]));

    let _ = stop.send(());
    handle.await.expect("join");
}
