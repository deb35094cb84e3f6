//! DragonSwap Factory interface (UniswapV2Factory fork)
use ethers::prelude::*;

abigen!(
    IDragonFactory,
    r#"[
        function getPair(address tokenA, address tokenB) external view returns (address pair)
    ]"#,
);
