mod solana_transfer;
