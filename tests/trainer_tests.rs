use ndarray::{s, Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use twonet::{Sgd, TrainConfig, TwoLayerNet};

/// Two well separated clusters, ten rows each.
fn separable_data() -> (Array2<f64>, Array1<usize>) {
    let x = Array2::from_shape_fn((20, 2), |(r, c)| {
        let side = if r % 2 == 0 { 1.0 } else { -1.0 };
        side * (1.0 + 0.05 * (r / 2) as f64) + if c == 0 { 0.1 } else { -0.1 }
    });
    let y = Array1::from_shape_fn(20, |r| r % 2);
    (x, y)
}

#[test]
fn test_training_reduces_loss() {
    let (x, y) = separable_data();
    let mut rng = StdRng::seed_from_u64(42);
    let mut model = TwoLayerNet::with_rng(2, 10, 2, 0.1, &mut rng).unwrap();
    let config = TrainConfig {
        learning_rate: 0.1,
        learning_rate_decay: 1.0,
        reg: 0.0,
        num_iters: 500,
        batch_size: 20,
        verbose: true,
    };

    let history = model.train_with_rng(&x, &y, &x, &y, &config, &mut rng).unwrap();

    let first = history.loss_history[0];
    let last = history.final_loss().unwrap();
    assert!(last < first, "loss went from {first} to {last}");
    assert_eq!(history.loss_history.len(), 500);
    // 20 rows / batch 20 -> one iteration per epoch
    assert_eq!(history.val_acc_history.len(), 500);
}

#[test]
fn test_zero_learning_rate_freezes_model() {
    let (x, y) = separable_data();
    let mut rng = StdRng::seed_from_u64(1);
    let mut model = TwoLayerNet::with_rng(2, 10, 2, 0.1, &mut rng).unwrap();
    let before = model.clone();
    let config = TrainConfig {
        learning_rate: 0.0,
        num_iters: 25,
        batch_size: 4,
        ..Default::default()
    };

    let history = model.train_with_rng(&x, &y, &x, &y, &config, &mut rng).unwrap();

    assert_eq!(model, before);
    assert_eq!(history.loss_history.len(), 25);
    // 20 / 4 = 5 iterations per epoch -> checkpoints at 0, 5, 10, 15, 20
    assert_eq!(history.train_acc_history.len(), 5);
    // a frozen model scores the same on the validation set every epoch
    assert!(history.val_acc_history.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_training_is_reproducible_with_seed() {
    let (x, y) = separable_data();
    let config = TrainConfig {
        learning_rate: 0.05,
        num_iters: 30,
        batch_size: 5,
        ..Default::default()
    };

    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut model = TwoLayerNet::with_rng(2, 6, 2, 1e-2, &mut rng).unwrap();
        let history = model.train_with_rng(&x, &y, &x, &y, &config, &mut rng).unwrap();
        (model, history)
    };

    let (model_a, history_a) = run(9);
    let (model_b, history_b) = run(9);
    assert_eq!(model_a, model_b);
    assert_eq!(history_a, history_b);
}

#[test]
fn test_minibatch_accuracy_in_unit_range() {
    let (x, y) = separable_data();
    let mut rng = StdRng::seed_from_u64(2);
    let mut model = TwoLayerNet::with_rng(2, 8, 2, 1e-2, &mut rng).unwrap();
    let config = TrainConfig {
        learning_rate: 0.1,
        num_iters: 40,
        batch_size: 3,
        ..Default::default()
    };

    let history = model.train_with_rng(&x, &y, &x, &y, &config, &mut rng).unwrap();

    // batch of 3 -> minibatch accuracy is a multiple of 1/3
    for acc in &history.train_acc_history {
        let thirds = acc * 3.0;
        assert!((thirds - thirds.round()).abs() < 1e-9, "unexpected minibatch accuracy {acc}");
    }
    for acc in &history.val_acc_history {
        assert!((0.0..=1.0).contains(acc));
    }
}

/// Steps the same minibatches by hand; `decay` is `None` to skip learning-rate decay.
fn replay(
    mut model: TwoLayerNet,
    x: &Array2<f64>,
    y: &Array1<usize>,
    config: &TrainConfig,
    decay: Option<f64>,
    rng: &mut StdRng,
) -> (TwoLayerNet, Vec<f64>) {
    let iterations_per_epoch = (x.nrows() / config.batch_size).max(1);
    let mut sgd = Sgd::new(config.learning_rate);
    let mut losses = Vec::new();
    for it in 0..config.num_iters {
        let indices: Vec<usize> = (0..config.batch_size)
            .map(|_| rng.random_range(0..x.nrows()))
            .collect();
        let x_batch = x.select(Axis(0), &indices);
        let y_batch = y.select(Axis(0), &indices);
        let (loss, grads) = model.loss(&x_batch, &y_batch, config.reg).unwrap();
        losses.push(loss);
        sgd.step(&mut model.params, &grads).unwrap();
        if let Some(factor) = decay {
            if it % iterations_per_epoch == 0 {
                sgd.decay(factor);
            }
        }
    }
    (model, losses)
}

#[test]
fn test_learning_rate_decays_after_each_epoch_boundary() {
    let (x, y) = separable_data();
    let x = x.slice(s![..12, ..]).to_owned();
    let y = y.slice(s![..12]).to_owned();
    // 12 rows / batch 4 -> epoch boundaries at iterations 0, 3 and 6
    let config = TrainConfig {
        learning_rate: 0.5,
        learning_rate_decay: 0.5,
        reg: 1e-3,
        num_iters: 9,
        batch_size: 4,
        verbose: false,
    };

    let mut rng = StdRng::seed_from_u64(17);
    let mut model = TwoLayerNet::with_rng(2, 5, 2, 0.1, &mut rng).unwrap();
    let initial = model.clone();
    let replay_rng = rng.clone();

    let history = model.train_with_rng(&x, &y, &x, &y, &config, &mut rng).unwrap();

    let (expected, losses) =
        replay(initial.clone(), &x, &y, &config, Some(0.5), &mut replay_rng.clone());
    assert_eq!(history.loss_history, losses);
    assert_eq!(model.params, expected.params);

    let (undecayed, _) = replay(initial, &x, &y, &config, None, &mut replay_rng.clone());
    assert_ne!(model.params, undecayed.params);
}
