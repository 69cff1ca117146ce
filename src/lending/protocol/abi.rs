//! 工作流用到的合约接口（Aave V2 + Chainlink + WETH）

use alloy_sol_types::sol;

sol! {
    interface IWeth {
        function deposit() external payable;
    }

    interface IERC20 {
        function approve(address spender, uint256 amount) external returns (bool);
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
    }

    interface ILendingPoolAddressesProvider {
        function getLendingPool() external view returns (address);
    }

    interface ILendingPool {
        function deposit(address asset, uint256 amount, address onBehalfOf, uint16 referralCode) external;
        function borrow(address asset, uint256 amount, uint256 interestRateMode, uint16 referralCode, address onBehalfOf) external;
        function repay(address asset, uint256 amount, uint256 rateMode, address onBehalfOf) external returns (uint256);
        function getUserAccountData(address user) external view returns (
            uint256 totalCollateralETH,
            uint256 totalDebtETH,
            uint256 availableBorrowsETH,
            uint256 currentLiquidationThreshold,
            uint256 ltv,
            uint256 healthFactor
        );
    }

    interface AggregatorV3Interface {
        function decimals() external view returns (uint8);
        function latestRoundData() external view returns (
            uint80 roundId,
            int256 answer,
            uint256 startedAt,
            uint256 updatedAt,
            uint80 answeredInRound
        );
    }
}

/// 合约调用标签，日志与测试里的调用记录都用它
pub mod methods {
    pub const WETH_DEPOSIT: &str = "WETH.deposit";
    pub const ERC20_APPROVE: &str = "ERC20.approve";
    pub const ERC20_BALANCE_OF: &str = "ERC20.balanceOf";
    pub const ERC20_DECIMALS: &str = "ERC20.decimals";
    pub const PROVIDER_GET_LENDING_POOL: &str = "LendingPoolAddressesProvider.getLendingPool";
    pub const POOL_DEPOSIT: &str = "LendingPool.deposit";
    pub const POOL_BORROW: &str = "LendingPool.borrow";
    pub const POOL_REPAY: &str = "LendingPool.repay";
    pub const POOL_GET_USER_ACCOUNT_DATA: &str = "LendingPool.getUserAccountData";
    pub const FEED_DECIMALS: &str = "PriceFeed.decimals";
    pub const FEED_LATEST_ROUND_DATA: &str = "PriceFeed.latestRoundData";
}
