//! DragonSwap Router interface (UniswapV2Router02 fork on Sei)
//! Native-asset entry points are named after SEI instead of ETH
use ethers::prelude::*;

abigen!(
    IDragonRouter,
    r#"[
        function factory() external pure returns (address)
        function WSEI() external pure returns (address)
        function addLiquidity(address tokenA, address tokenB, uint amountADesired, uint amountBDesired, uint amountAMin, uint amountBMin, address to, uint deadline) external returns (uint amountA, uint amountB, uint liquidity)
        function addLiquiditySEI(address token, uint amountTokenDesired, uint amountTokenMin, uint amountSEIMin, address to, uint deadline) external payable returns (uint amountToken, uint amountSEI, uint liquidity)
        function removeLiquidity(address tokenA, address tokenB, uint liquidity, uint amountAMin, uint amountBMin, address to, uint deadline) external returns (uint amountA, uint amountB)
        function removeLiquiditySEI(address token, uint liquidity, uint amountTokenMin, uint amountSEIMin, address to, uint deadline) external returns (uint amountToken, uint amountSEI)
        function swapExactTokensForTokens(uint amountIn, uint amountOutMin, address[] calldata path, address to, uint deadline) external returns (uint[] memory amounts)
        function swapExactSEIForTokens(uint amountOutMin, address[] calldata path, address to, uint deadline) external payable returns (uint[] memory amounts)
        function swapExactTokensForSEI(uint amountIn, uint amountOutMin, address[] calldata path, address to, uint deadline) external returns (uint[] memory amounts)
        function quote(uint amountA, uint reserveA, uint reserveB) external pure returns (uint amountB)
        function getAmountsOut(uint amountIn, address[] calldata path) external view returns (uint[] memory amounts)
    ]"#,
);
