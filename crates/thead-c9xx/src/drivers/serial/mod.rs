pub mod sunxi_uart;
